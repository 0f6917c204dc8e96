//! Interval decomposition and the derived sequence of graphs.
//!
//! An interval `I(h)` is the maximal single-entry subgraph headed by `h` in
//! which every cycle passes through `h` (Allen and Cocke). Collapsing every
//! interval of a graph into one node gives the next derived graph; repeating
//! this until the size stops shrinking gives the derived sequence
//! `G¹ … Gⁿ`. A graph is reducible exactly when `Gⁿ` is a single node.

use std::collections::BTreeSet;

use crate::{
    analysis::cfg::{Attrs, Cfg, Node, ATTR_ENTRY},
    utils::graph::{algorithms::DfsNumbering, GraphBase, NodeId, Predecessors},
    Result,
};

/// One interval of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    header: NodeId,
    nodes: Vec<NodeId>,
}

impl Interval {
    /// Returns the header, the only entry into the interval.
    #[must_use]
    pub fn header(&self) -> NodeId {
        self.header
    }

    /// Returns the members in the order they were added, header first.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns `true` if `node` belongs to the interval.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: an interval holds at least its header.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Computes the intervals of `cfg`.
///
/// Headers are discovered, and members added, in reverse post-order, so the
/// result is deterministic. Nodes unreachable from the entry belong to no
/// interval.
///
/// # Errors
///
/// Returns [`Error::InvalidCfg`](crate::Error::InvalidCfg) if the graph has no entry.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::{intervals, Cfg};
///
/// let cfg = Cfg::from_dot(r#"
///     digraph { A [entry=true]; A -> B; B -> C; C -> B [cond=true]; C -> D [cond=false] }
/// "#).unwrap();
/// let found = intervals(&cfg).unwrap();
/// let headers: Vec<_> = found.iter().map(|i| cfg.label(i.header())).collect();
/// assert_eq!(headers, vec!["A", "B"]);
/// ```
pub fn intervals(cfg: &Cfg) -> Result<Vec<Interval>> {
    let Some(entry) = cfg.entry() else {
        return Err(invalid_cfg!("graph '{}' has no entry node", cfg.name()));
    };

    let numbering = DfsNumbering::compute(cfg, entry);
    let rpo = numbering.reverse_postorder();
    let bound = cfg.node_bound();

    let mut owner: Vec<Option<usize>> = vec![None; bound];
    let mut is_header = vec![false; bound];
    let mut headers = vec![entry];
    is_header[entry.index()] = true;

    let mut result = Vec::new();
    let mut next = 0;
    while let Some(&header) = headers.get(next) {
        let index = next;
        next += 1;

        owner[header.index()] = Some(index);
        let mut nodes = vec![header];

        // Grow I(h) until no node has all of its predecessors inside
        let mut changed = true;
        while changed {
            changed = false;
            for &node in rpo {
                if owner[node.index()].is_some() || is_header[node.index()] {
                    continue;
                }
                let mut preds = cfg.predecessors(node).peekable();
                if preds.peek().is_none() {
                    continue;
                }
                if preds.all(|p| owner[p.index()] == Some(index)) {
                    owner[node.index()] = Some(index);
                    nodes.push(node);
                    changed = true;
                }
            }
        }

        // Nodes entered from I(h) but not absorbed head new intervals
        for &node in rpo {
            if owner[node.index()].is_none()
                && !is_header[node.index()]
                && cfg
                    .predecessors(node)
                    .any(|p| owner[p.index()] == Some(index))
            {
                is_header[node.index()] = true;
                headers.push(node);
            }
        }

        result.push(Interval { header, nodes });
    }

    Ok(result)
}

/// The derived sequence of a graph together with the intervals of each level.
///
/// `graphs()[0]` is a copy of the input, with the same node ids. The node
/// representing an interval in the next level carries the header's label.
#[derive(Debug, Clone)]
pub struct DerivedSequence {
    graphs: Vec<Cfg>,
    intervals: Vec<Vec<Interval>>,
}

impl DerivedSequence {
    /// Returns the graphs `G¹ … Gⁿ`.
    #[must_use]
    pub fn graphs(&self) -> &[Cfg] {
        &self.graphs
    }

    /// Returns the intervals of each graph, `intervals()[i]` belonging to `graphs()[i]`.
    #[must_use]
    pub fn intervals(&self) -> &[Vec<Interval>] {
        &self.intervals
    }

    /// Returns the number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Always `false`: the sequence holds at least the input graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Returns the limit graph `Gⁿ`.
    #[must_use]
    pub fn limit(&self) -> Option<&Cfg> {
        self.graphs.last()
    }

    /// Returns `true` if the limit graph is a single node.
    #[must_use]
    pub fn is_reducible(&self) -> bool {
        self.limit().is_some_and(|g| g.node_count() == 1)
    }
}

/// Collapses every interval of `cfg` into one node.
///
/// An edge `u -> v` where `v` heads another interval becomes an edge between
/// the nodes of the two intervals. Edges that stay inside one interval vanish,
/// back-edges into its header included: a self-looping node can never join an
/// interval, so keeping them would stall the sequence at the first loop.
/// Parallel edges are collapsed.
fn collapse(cfg: &Cfg, intervals: &[Interval]) -> Result<Cfg> {
    let mut owner: Vec<Option<usize>> = vec![None; cfg.node_bound()];
    for (index, interval) in intervals.iter().enumerate() {
        for node in &interval.nodes {
            owner[node.index()] = Some(index);
        }
    }

    let mut derived = Cfg::new(cfg.name());
    let mut ids = Vec::with_capacity(intervals.len());
    for interval in intervals {
        let mut node = Node::new(cfg.label(interval.header));
        if cfg.entry() == Some(interval.header) {
            node = node.with_attr(ATTR_ENTRY, "true");
        }
        ids.push(derived.add_node(node)?);
    }

    let mut edges = BTreeSet::new();
    for (target, interval) in intervals.iter().enumerate() {
        for pred in cfg.predecessors(interval.header) {
            match owner[pred.index()] {
                Some(source) if source != target => {
                    edges.insert((source, target));
                }
                _ => {}
            }
        }
    }
    for (source, target) in edges {
        derived.add_edge(ids[source], ids[target], Attrs::new())?;
    }

    Ok(derived)
}

/// Computes the derived sequence of `cfg`.
///
/// Construction stops before the first graph that is no smaller than its
/// predecessor, so the last graph is the limit.
///
/// # Errors
///
/// Returns [`Error::InvalidCfg`](crate::Error::InvalidCfg) if the graph has no entry.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::{derived_sequence, Cfg};
///
/// let cfg = Cfg::from_dot(r#"
///     digraph { A [entry=true]; A -> B; B -> C; C -> B [cond=true]; C -> D [cond=false] }
/// "#).unwrap();
/// let seq = derived_sequence(&cfg).unwrap();
/// assert_eq!(seq.len(), 3);
/// assert!(seq.is_reducible());
/// ```
pub fn derived_sequence(cfg: &Cfg) -> Result<DerivedSequence> {
    let mut graphs = vec![cfg.clone()];
    let mut levels = Vec::new();

    loop {
        let Some(current) = graphs.last() else {
            break;
        };
        let found = intervals(current)?;
        let next = collapse(current, &found)?;
        let shrunk = next.node_count() < current.node_count();
        levels.push(found);
        if !shrunk {
            break;
        }
        graphs.push(next);
    }

    Ok(DerivedSequence {
        graphs,
        intervals: levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::graph::Successors;

    fn headers(cfg: &Cfg, found: &[Interval]) -> Vec<String> {
        found
            .iter()
            .map(|i| cfg.label(i.header()).to_string())
            .collect()
    }

    fn members(cfg: &Cfg, interval: &Interval) -> Vec<String> {
        interval
            .nodes()
            .iter()
            .map(|n| cfg.label(*n).to_string())
            .collect()
    }

    #[test]
    fn test_single_interval_for_acyclic_graph() {
        let cfg = Cfg::from_dot(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> D; C -> D }",
        )
        .unwrap();
        let found = intervals(&cfg).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(members(&cfg, &found[0]), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_loop_starts_new_interval() {
        let cfg = Cfg::from_dot(
            "digraph { A [entry=true]; A -> B; B -> C; C -> B [cond=true]; C -> D [cond=false] }",
        )
        .unwrap();
        let found = intervals(&cfg).unwrap();
        assert_eq!(headers(&cfg, &found), vec!["A", "B"]);
        assert_eq!(members(&cfg, &found[0]), vec!["A"]);
        assert_eq!(members(&cfg, &found[1]), vec!["B", "C", "D"]);

        // Every non-header member has all predecessors inside
        for interval in &found {
            for &node in &interval.nodes()[1..] {
                assert!(cfg.predecessors(node).all(|p| interval.contains(p)));
            }
        }
    }

    #[test]
    fn test_derived_sequence_of_nested_loops() {
        let cfg = Cfg::from_dot(
            r#"digraph {
                A [entry=true]; A -> B;
                B -> C;
                C -> C [cond=true]; C -> D [cond=false];
                D -> B [cond=true]; D -> E [cond=false];
            }"#,
        )
        .unwrap();
        let seq = derived_sequence(&cfg).unwrap();
        let sizes: Vec<_> = seq.graphs().iter().map(GraphBase::node_count).collect();
        assert_eq!(sizes, vec![5, 3, 2, 1]);
        assert_eq!(seq.intervals().len(), seq.len());
        assert!(seq.is_reducible());

        // The inner loop C is gone one level up, the outer one is not
        let g2 = &seq.graphs()[1];
        let b = g2.node_with_label("B").unwrap();
        let c = g2.node_with_label("C").unwrap();
        assert!(g2.edge(c, c).is_none());
        assert!(g2.edge(c, b).is_some());
        assert_eq!(g2.entry(), g2.node_with_label("A"));
    }

    #[test]
    fn test_irreducible_limit() {
        let cfg = Cfg::from_dot(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> C; C -> B }",
        )
        .unwrap();
        let seq = derived_sequence(&cfg).unwrap();
        assert_eq!(seq.len(), 1);
        assert!(!seq.is_reducible());
        assert_eq!(headers(&cfg, &seq.intervals()[0]), vec!["A", "B", "C"]);
        assert_eq!(seq.limit().map(GraphBase::node_count), Some(3));
    }

    #[test]
    fn test_back_edges_inside_interval_vanish() {
        let cfg = Cfg::from_dot(
            r#"digraph {
                A [entry=true]; A -> B; B -> B;
                B -> C [cond=true]; B -> D [cond=false];
                C -> B; D -> B;
            }"#,
        )
        .unwrap();
        let seq = derived_sequence(&cfg).unwrap();
        let g2 = &seq.graphs()[1];
        let a = g2.node_with_label("A").unwrap();
        let b = g2.node_with_label("B").unwrap();
        assert_eq!(g2.successors(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(g2.successors(b).count(), 0);
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_no_entry() {
        let cfg = Cfg::from_dot("digraph { A -> B }").unwrap();
        assert!(intervals(&cfg).is_err());
        assert!(derived_sequence(&cfg).is_err());
    }
}
