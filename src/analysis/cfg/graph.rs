//! Control Flow Graph implementation.
//!
//! [`Cfg`] is an arena of labelled basic blocks with a distinguished entry.
//! Nodes and edges are addressed by [`NodeId`] / [`EdgeId`]; removing a node
//! leaves a hole and its id is never handed out again.
//!
//! # Deterministic Iteration
//!
//! Every iteration order is a function of labels and edge conditions only:
//!
//! - nodes and predecessors are sorted by the natural order of their labels;
//! - successors are sorted by [`BranchKind`](crate::analysis::BranchKind)
//!   first (`true`, `false`, cases, unconditional, `default`) and by target
//!   label second.
//!
//! The adjacency lists are kept sorted on insertion, so iteration does not sort.

use std::{cmp::Ordering, collections::HashMap};

use crate::{
    analysis::cfg::{
        edge::{Edge, EdgeId},
        node::{Attrs, LoopType, Node, StructInfo, ATTR_COND, ATTR_ENTRY},
    },
    utils::{
        graph::{
            algorithms::{compute_dominators, DfsNumbering, DominatorTree},
            GraphBase, NodeId, Predecessors, Successors,
        },
        natural_cmp,
    },
    Error, Result,
};

/// A control flow graph of one function.
///
/// # Invariants
///
/// - Node labels are unique.
/// - At most one node is the entry; it carries `entry="true"`.
/// - There is at most one edge per ordered pair of nodes. Self-loops are allowed.
///
/// Reachability of every node from the entry is not enforced while a graph is
/// being built; [`Cfg::validate`] checks it and both drivers call it.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::{Attrs, Cfg};
/// use restructure::utils::graph::Successors;
///
/// let mut cfg = Cfg::new("f");
/// let a = cfg.add_block("A").unwrap();
/// let b = cfg.add_block("B").unwrap();
/// let c = cfg.add_block("C").unwrap();
/// cfg.set_entry(a).unwrap();
///
/// let mut attrs = Attrs::new();
/// attrs.insert("cond".into(), "false".into());
/// cfg.add_edge(a, b, attrs).unwrap();
/// let mut attrs = Attrs::new();
/// attrs.insert("cond".into(), "true".into());
/// cfg.add_edge(a, c, attrs).unwrap();
///
/// // The true branch comes first whatever the insertion order
/// assert_eq!(cfg.successors(a).collect::<Vec<_>>(), vec![c, b]);
/// cfg.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Cfg {
    name: String,
    graph_attrs: Attrs,
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    /// Outgoing edges per node, in successor order
    outgoing: Vec<Vec<EdgeId>>,
    /// Incoming edges per node, in predecessor order
    incoming: Vec<Vec<EdgeId>>,
    /// Live nodes in natural label order
    order: Vec<NodeId>,
    labels: HashMap<String, NodeId>,
    entry: Option<NodeId>,
}

impl Cfg {
    /// Creates an empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Cfg {
            name: name.into(),
            graph_attrs: Attrs::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            order: Vec::new(),
            labels: HashMap::new(),
            entry: None,
        }
    }

    /// Returns the graph name (the DOT graph id).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the graph name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the graph-level attributes.
    #[must_use]
    pub fn graph_attrs(&self) -> &Attrs {
        &self.graph_attrs
    }

    /// Returns the graph-level attributes for modification.
    pub fn graph_attrs_mut(&mut self) -> &mut Attrs {
        &mut self.graph_attrs
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Adds a node and returns its id.
    ///
    /// A node carrying `entry="true"` becomes the entry. Its
    /// [`is_cond_node`](StructInfo::is_cond_node) flag is read from `cond_node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] if the label is taken or if the node is a
    /// second entry.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId> {
        if self.labels.contains_key(&node.label) {
            return Err(invalid_cfg!("duplicate node label '{}'", node.label));
        }
        if node.is_entry() {
            if let Some(existing) = self.entry {
                return Err(invalid_cfg!(
                    "second entry node '{}' (entry is '{}')",
                    node.label,
                    self.label(existing)
                ));
            }
        }

        let id = NodeId::new(self.nodes.len());
        let pos = self
            .order
            .partition_point(|n| natural_cmp(self.label(*n), &node.label) == Ordering::Less);

        node.info = StructInfo::for_attrs(&node.attrs);
        if node.is_entry() {
            self.entry = Some(id);
        }
        self.labels.insert(node.label.clone(), id);
        self.order.insert(pos, id);
        self.nodes.push(Some(node));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(id)
    }

    /// Adds a node without attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] if the label is taken.
    pub fn add_block(&mut self, label: impl Into<String>) -> Result<NodeId> {
        self.add_node(Node::new(label))
    }

    /// Removes a node together with all of its edges.
    ///
    /// Removing an absent node does nothing and returns `None`. If the node was
    /// the entry, the graph has no entry afterwards.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.get_mut(id.index())?.take()?;

        let mut attached = std::mem::take(&mut self.outgoing[id.index()]);
        attached.append(&mut self.incoming[id.index()]);
        for edge_id in attached {
            // Self-loops are listed twice
            let Some(edge) = self.edges[edge_id.index()].take() else {
                continue;
            };
            if edge.from != id {
                self.outgoing[edge.from.index()].retain(|e| *e != edge_id);
            }
            if edge.to != id {
                self.incoming[edge.to.index()].retain(|e| *e != edge_id);
            }
        }

        self.labels.remove(&node.label);
        self.order.retain(|n| *n != id);
        if self.entry == Some(id) {
            self.entry = None;
        }
        Some(node)
    }

    /// Returns the node with the given id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns all nodes in natural label order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|id| self.node(*id))
    }

    /// Returns the label of a node.
    ///
    /// Labels are looked up for back-references all the time; a stale id is a bug
    /// in the caller and trips a debug assertion. Release builds return `""`.
    #[must_use]
    pub fn label(&self, id: NodeId) -> &str {
        debug_assert!(self.contains_node(id), "stale node id {id}");
        self.node(id).map_or("", |n| n.label.as_str())
    }

    /// Looks up a node by label.
    #[must_use]
    pub fn node_with_label(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    /// Returns the structuring annotations of a node.
    #[must_use]
    pub fn info(&self, id: NodeId) -> Option<&StructInfo> {
        self.node(id).map(|n| &n.info)
    }

    /// Returns the structuring annotations of a node for modification.
    pub fn info_mut(&mut self, id: NodeId) -> Option<&mut StructInfo> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .map(|n| &mut n.info)
    }

    /// Returns the entry node.
    #[must_use]
    pub fn entry(&self) -> Option<NodeId> {
        self.entry
    }

    /// Makes `id` the entry node and marks it with `entry="true"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] for an absent node and [`Error::InvalidCfg`]
    /// if a different node is already the entry.
    pub fn set_entry(&mut self, id: NodeId) -> Result<()> {
        if !self.contains_node(id) {
            return Err(Error::UnknownNode(id.to_string()));
        }
        match self.entry {
            Some(existing) if existing != id => {
                return Err(invalid_cfg!(
                    "second entry node '{}' (entry is '{}')",
                    self.label(id),
                    self.label(existing)
                ))
            }
            _ => {}
        }

        self.entry = Some(id);
        if let Some(node) = self.nodes[id.index()].as_mut() {
            node.attrs.insert(ATTR_ENTRY.to_string(), "true".to_string());
        }
        Ok(())
    }

    fn cmp_outgoing(&self, a: EdgeId, b: EdgeId) -> Ordering {
        match (&self.edges[a.index()], &self.edges[b.index()]) {
            (Some(a), Some(b)) => a
                .kind()
                .cmp(&b.kind())
                .then_with(|| natural_cmp(self.label(a.to), self.label(b.to))),
            _ => Ordering::Equal,
        }
    }

    fn cmp_incoming(&self, a: EdgeId, b: EdgeId) -> Ordering {
        match (&self.edges[a.index()], &self.edges[b.index()]) {
            (Some(a), Some(b)) => natural_cmp(self.label(a.from), self.label(b.from)),
            _ => Ordering::Equal,
        }
    }

    /// Adds an edge `from -> to` with the given attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] if an endpoint is missing or the edge exists
    /// already.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, attrs: Attrs) -> Result<EdgeId> {
        if !self.contains_node(from) || !self.contains_node(to) {
            return Err(invalid_cfg!("edge {} -> {} references a missing node", from, to));
        }
        if self.edge_id(from, to).is_some() {
            return Err(invalid_cfg!(
                "parallel edge '{}' -> '{}'",
                self.label(from),
                self.label(to)
            ));
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge { from, to, attrs }));

        let out_pos = self.outgoing[from.index()]
            .partition_point(|e| self.cmp_outgoing(*e, id) == Ordering::Less);
        self.outgoing[from.index()].insert(out_pos, id);

        let in_pos = self.incoming[to.index()]
            .partition_point(|e| self.cmp_incoming(*e, id) == Ordering::Less);
        self.incoming[to.index()].insert(in_pos, id);

        Ok(id)
    }

    /// Adds an edge, copying the attributes given as key/value pairs.
    ///
    /// # Errors
    ///
    /// See [`Cfg::add_edge`].
    pub fn connect(&mut self, from: NodeId, to: NodeId, attrs: &[(&str, &str)]) -> Result<EdgeId> {
        let attrs = attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.add_edge(from, to, attrs)
    }

    fn edge_id(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.outgoing.get(from.index())?.iter().copied().find(|e| {
            self.edges[e.index()]
                .as_ref()
                .is_some_and(|edge| edge.to == to)
        })
    }

    /// Returns the edge `from -> to`, if present.
    #[must_use]
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.edge_id(from, to)
            .and_then(|e| self.edges[e.index()].as_ref())
    }

    /// Removes the edge `from -> to` and returns it.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> Option<Edge> {
        let id = self.edge_id(from, to)?;
        let edge = self.edges[id.index()].take()?;
        self.outgoing[from.index()].retain(|e| *e != id);
        self.incoming[to.index()].retain(|e| *e != id);
        Some(edge)
    }

    /// Sets one attribute of the edge `from -> to`.
    ///
    /// Changing `cond` re-sorts the successors of `from`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] if the edge does not exist.
    pub fn set_edge_attr(
        &mut self,
        from: NodeId,
        to: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let Some(id) = self.edge_id(from, to) else {
            return Err(invalid_cfg!("no edge {} -> {}", from, to));
        };

        let key = key.into();
        let resort = key == ATTR_COND;
        if let Some(edge) = self.edges[id.index()].as_mut() {
            edge.attrs.insert(key, value.into());
        }

        if resort {
            let mut list = std::mem::take(&mut self.outgoing[from.index()]);
            list.sort_by(|a, b| self.cmp_outgoing(*a, *b));
            self.outgoing[from.index()] = list;
        }
        Ok(())
    }

    /// Returns the outgoing edges of a node in successor order.
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(id.index())
            .into_iter()
            .flatten()
            .filter_map(|e| self.edges[e.index()].as_ref())
    }

    /// Returns the incoming edges of a node in predecessor order.
    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming
            .get(id.index())
            .into_iter()
            .flatten()
            .filter_map(|e| self.edges[e.index()].as_ref())
    }

    /// Returns all edges, grouped by source in node order, each group in successor order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.order.iter().flat_map(|n| self.out_edges(*n))
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Checks that an entry exists and every node is reachable from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] naming the first violation.
    pub fn validate(&self) -> Result<()> {
        let Some(entry) = self.entry else {
            return Err(invalid_cfg!("graph '{}' has no entry node", self.name));
        };

        let numbering = DfsNumbering::compute(self, entry);
        if numbering.count() != self.node_count() {
            if let Some(orphan) = self.order.iter().find(|n| !numbering.is_reachable(**n)) {
                return Err(invalid_cfg!(
                    "node '{}' is unreachable from entry '{}'",
                    self.label(*orphan),
                    self.label(entry)
                ));
            }
        }
        Ok(())
    }

    /// Clears every structuring annotation, keeping only the `cond_node` hint.
    pub fn reset_struct_info(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.info = StructInfo::for_attrs(&node.attrs);
        }
    }

    /// Numbers the nodes in DFS pre-, post- and reverse post-order from the entry
    /// and stores the numbers in their [`StructInfo`].
    ///
    /// Running it twice on the same graph gives the same numbers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] if the graph has no entry.
    pub fn init_dfs_numbers(&mut self) -> Result<DfsNumbering> {
        let Some(entry) = self.entry else {
            return Err(invalid_cfg!("graph '{}' has no entry node", self.name));
        };

        let numbering = DfsNumbering::compute(self, entry);
        for node in self.order.clone() {
            let (Some(pre), Some(post), Some(rpn)) = (
                numbering.pre_num(node),
                numbering.post_num(node),
                numbering.rev_post_num(node),
            ) else {
                continue;
            };
            if let Some(info) = self.info_mut(node) {
                info.pre_num = pre;
                info.post_num = post;
                info.rev_post_num = rpn;
            }
        }
        Ok(numbering)
    }

    /// Computes the dominator tree rooted at the entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] if the graph has no entry.
    pub fn dominators(&self) -> Result<DominatorTree> {
        match self.entry {
            Some(entry) => Ok(compute_dominators(self, entry)),
            None => Err(invalid_cfg!("graph '{}' has no entry node", self.name)),
        }
    }

    /// Copies the structuring annotations into node attributes, so that they show
    /// up in DOT output.
    ///
    /// Written keys: `loop_type`, `loop_head`, `loop_follow`, `loop_latch`,
    /// `follow` and `comp_cond`. Back-references are written as labels.
    pub fn export_annotations(&mut self) {
        let mut updates: Vec<(NodeId, Vec<(&'static str, String)>)> = Vec::new();
        for &id in &self.order {
            let Some(info) = self.info(id) else {
                continue;
            };

            let mut attrs = Vec::new();
            if info.loop_type != LoopType::None {
                attrs.push(("loop_type", info.loop_type.to_string()));
            }
            if let Some(head) = info.loop_head {
                attrs.push(("loop_head", self.label(head).to_string()));
            }
            if let Some(follow) = info.loop_follow {
                attrs.push(("loop_follow", self.label(follow).to_string()));
            }
            if info.is_loop_latch {
                attrs.push(("loop_latch", "true".to_string()));
            }
            if let Some(follow) = info.follow {
                attrs.push(("follow", self.label(follow).to_string()));
            }
            if let Some(cond) = &info.comp_cond {
                attrs.push(("comp_cond", cond.to_string()));
            }
            if !attrs.is_empty() {
                updates.push((id, attrs));
            }
        }

        for (id, attrs) in updates {
            if let Some(node) = self.nodes[id.index()].as_mut() {
                for (key, value) in attrs {
                    node.attrs.insert(key.to_string(), value);
                }
            }
        }
    }

    /// Label-based view of all edges, used for structural comparison.
    fn edge_labels(&self) -> Vec<(&str, &str, &Attrs)> {
        self.edges()
            .map(|e| (self.label(e.from), self.label(e.to), &e.attrs))
            .collect()
    }
}

impl PartialEq for Cfg {
    /// Structural equality: same labels, node attributes, edges with their
    /// attributes, and entry label. Arena ids and the graph name do not matter.
    fn eq(&self, other: &Self) -> bool {
        if self.order.len() != other.order.len() {
            return false;
        }
        let nodes_equal = self
            .nodes()
            .zip(other.nodes())
            .all(|(a, b)| a.label == b.label && a.attrs == b.attrs);
        let entry_equal =
            self.entry.map(|e| self.label(e)) == other.entry.map(|e| other.label(e));

        nodes_equal && entry_equal && self.edge_labels() == other.edge_labels()
    }
}

impl Eq for Cfg {}

impl GraphBase for Cfg {
    fn node_count(&self) -> usize {
        self.order.len()
    }

    fn node_bound(&self) -> usize {
        self.nodes.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        self.order.iter().copied()
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }
}

impl Successors for Cfg {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.out_edges(node).map(|e| e.to)
    }
}

impl Predecessors for Cfg {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.in_edges(node).map(|e| e.from)
    }
}
