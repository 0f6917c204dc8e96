//! Collapsing a primitive into a single node.
//!
//! [`merge`] is the rewrite step of the hammock driver. All nodes a primitive
//! names are replaced by one node that carries the entry's label and
//! attributes; edges leaving or entering the set are redirected to it.

use std::collections::HashSet;

use crate::{
    analysis::cfg::{
        graph::Cfg,
        node::{Attrs, Node, ATTR_ENTRY},
    },
    primitive::Primitive,
    utils::graph::{GraphBase, NodeId},
    Error, Result,
};

/// Replaces the nodes named by `primitive` with a single node labelled
/// `primitive.entry()`.
///
/// - External predecessors and successors of any merged node are connected to
///   the new node. When several merged nodes connect to the same external node,
///   the first edge wins: merged nodes are visited entry first, then in node
///   order, and each node's edges in predecessor / successor order.
/// - Edges inside the merged set are dropped, except edges back into the
///   entry: those become a self-loop of the new node. A sequence whose exit
///   branches back to its entry is still a loop afterwards, and merging a
///   single node yields an isomorphic graph. For a loop primitive only its own
///   back-edge (`body -> cond`, or `cond -> cond` for `post_loop`) is dropped;
///   an enclosing loop closed from the exit survives as the self-loop.
/// - If any merged node was the entry, the new node is the entry.
///
/// The operation is all-or-nothing: the graph is untouched if an error is returned.
///
/// # Errors
///
/// - [`Error::UnknownNode`] if a label of the primitive is not in the graph
/// - [`Error::MergeFailed`] if the primitive is inconsistent in itself
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::{merge, Cfg};
/// use restructure::primitive::Primitive;
///
/// let mut cfg = Cfg::from_dot("digraph { A [entry=true]; A -> B -> C }").unwrap();
/// merge(&mut cfg, &Primitive::Seq { entry: "A".into(), exit: "B".into() }).unwrap();
///
/// let a = cfg.node_with_label("A").unwrap();
/// let c = cfg.node_with_label("C").unwrap();
/// assert_eq!(cfg.node_with_label("B"), None);
/// assert!(cfg.edge(a, c).is_some());
/// assert_eq!(cfg.entry(), Some(a));
/// ```
pub fn merge(cfg: &mut Cfg, primitive: &Primitive) -> Result<NodeId> {
    let mut ids = Vec::new();
    for label in primitive.labels() {
        let id = cfg
            .node_with_label(&label)
            .ok_or_else(|| Error::UnknownNode(label.clone()))?;
        ids.push(id);
    }
    let back_edge = match primitive {
        Primitive::PreLoop { cond, body, .. } => Some((body, cond)),
        Primitive::PostLoop { cond, .. } => Some((cond, cond)),
        Primitive::Loop { head, latch, .. } => Some((latch, head)),
        _ => None,
    }
    .and_then(|(from, to)| Some((cfg.node_with_label(from)?, cfg.node_with_label(to)?)));
    cfg.merge_nodes(&ids, back_edge)
}

impl Cfg {
    /// Collapses `nodes` into one node; `nodes[0]` provides label and attributes.
    ///
    /// Edges from the set into `nodes[0]` turn into a self-loop of the new node
    /// (the first one's attributes win), except `loop_edge`, the back-edge of
    /// the loop being collapsed. Every other internal edge is dropped. See
    /// [`merge`] for the other rewiring rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MergeFailed`] for an empty set, a duplicate id, and
    /// [`Error::UnknownNode`] for an id that is not in the graph.
    pub fn merge_nodes(
        &mut self,
        nodes: &[NodeId],
        loop_edge: Option<(NodeId, NodeId)>,
    ) -> Result<NodeId> {
        let Some(&head) = nodes.first() else {
            return Err(Error::MergeFailed("nothing to merge".to_string()));
        };

        let mut set = HashSet::with_capacity(nodes.len());
        for &id in nodes {
            if self.node(id).is_none() {
                return Err(Error::UnknownNode(id.to_string()));
            }
            if !set.insert(id) {
                return Err(Error::MergeFailed(format!(
                    "node '{}' is listed twice",
                    self.label(id)
                )));
            }
        }

        // Entry first, then the rest in node order
        let mut ordered = vec![head];
        ordered.extend(self.node_ids().filter(|n| *n != head && set.contains(n)));

        let mut preds: Vec<(NodeId, Attrs)> = Vec::new();
        let mut succs: Vec<(NodeId, Attrs)> = Vec::new();
        let mut self_loop: Option<Attrs> = None;

        for &id in &ordered {
            for edge in self.in_edges(id) {
                if !set.contains(&edge.from) && !preds.iter().any(|(p, _)| *p == edge.from) {
                    preds.push((edge.from, edge.attrs.clone()));
                }
            }
            for edge in self.out_edges(id) {
                if set.contains(&edge.to) {
                    if edge.to == head
                        && self_loop.is_none()
                        && loop_edge != Some((edge.from, edge.to))
                    {
                        self_loop = Some(edge.attrs.clone());
                    }
                    continue;
                }
                if !succs.iter().any(|(s, _)| *s == edge.to) {
                    succs.push((edge.to, edge.attrs.clone()));
                }
            }
        }

        let was_entry = self.entry().is_some_and(|e| set.contains(&e));
        let Some(template) = self.node(head) else {
            return Err(Error::UnknownNode(head.to_string()));
        };
        let mut attrs = template.attrs.clone();
        let label = template.label.clone();
        if was_entry {
            attrs.insert(ATTR_ENTRY.to_string(), "true".to_string());
        } else {
            attrs.remove(ATTR_ENTRY);
        }

        for &id in &ordered {
            self.remove_node(id);
        }

        let merged = self.add_node(Node::with_attrs(label, attrs))?;
        for (pred, attrs) in preds {
            self.add_edge(pred, merged, attrs)?;
        }
        for (succ, attrs) in succs {
            self.add_edge(merged, succ, attrs)?;
        }
        if let Some(attrs) = self_loop {
            self.add_edge(merged, merged, attrs)?;
        }
        Ok(merged)
    }
}
