//! Trait definitions for graph abstractions.
//!
//! The algorithms in [`algorithms`](crate::utils::graph::algorithms) are written
//! against these traits rather than against [`Cfg`](crate::analysis::Cfg) directly,
//! so the same traversal and dominator code runs over the input graph and over
//! every graph of a derived sequence.
//!
//! # Architecture
//!
//! - [`GraphBase`] - Core properties: node count, arena bound and node iteration
//! - [`Successors`] - Forward edge traversal (outgoing edges)
//! - [`Predecessors`] - Backward edge traversal (incoming edges)
//!
//! # Determinism
//!
//! Implementations must yield nodes and neighbours in a stable order that depends
//! only on the graph's contents. Every structuring result is derived from the first
//! match in iteration order, so an unstable order would make results unstable too.

use crate::utils::graph::NodeId;

/// Base trait providing core graph properties.
///
/// # Required Methods
///
/// - [`node_count`](GraphBase::node_count) - Returns the number of live nodes
/// - [`node_ids`](GraphBase::node_ids) - Returns an iterator over live node ids
///
/// Arena-backed graphs with holes should also override
/// [`node_bound`](GraphBase::node_bound).
pub trait GraphBase {
    /// Returns the number of live nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns one past the largest node index that may be live.
    ///
    /// Algorithms size their per-node tables with this value. For graphs without
    /// holes it equals [`node_count`](GraphBase::node_count).
    fn node_bound(&self) -> usize {
        self.node_count()
    }

    /// Returns an iterator over all live node identifiers in the graph.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;

    /// Returns `true` if `node` is a live node of this graph.
    fn contains_node(&self, node: NodeId) -> bool {
        self.node_ids().any(|n| n == node)
    }
}

/// Trait for graphs that support forward edge traversal.
///
/// For a directed edge `(u, v)`, node `v` is a successor of `u`.
pub trait Successors: GraphBase {
    /// Returns an iterator over the successor nodes of the given node.
    ///
    /// An absent node has no successors.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;

    /// Returns the number of successors of `node`.
    fn out_degree(&self, node: NodeId) -> usize {
        self.successors(node).count()
    }
}

/// Trait for graphs that support backward edge traversal.
///
/// For a directed edge `(u, v)`, node `u` is a predecessor of `v`.
pub trait Predecessors: GraphBase {
    /// Returns an iterator over the predecessor nodes of the given node.
    ///
    /// An absent node has no predecessors.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;

    /// Returns the number of predecessors of `node`.
    fn in_degree(&self, node: NodeId) -> usize {
        self.predecessors(node).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A minimal graph with a hole at index 1
    struct TestGraph {
        live: Vec<bool>,
        edges: Vec<(NodeId, NodeId)>,
    }

    impl GraphBase for TestGraph {
        fn node_count(&self) -> usize {
            self.live.iter().filter(|l| **l).count()
        }

        fn node_bound(&self) -> usize {
            self.live.len()
        }

        fn node_ids(&self) -> impl Iterator<Item = NodeId> {
            self.live
                .iter()
                .enumerate()
                .filter(|(_, l)| **l)
                .map(|(i, _)| NodeId::new(i))
        }
    }

    impl Successors for TestGraph {
        fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(src, _)| *src == node)
                .map(|(_, dst)| *dst)
        }
    }

    impl Predecessors for TestGraph {
        fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(_, dst)| *dst == node)
                .map(|(src, _)| *src)
        }
    }

    fn graph() -> TestGraph {
        TestGraph {
            live: vec![true, false, true, true],
            edges: vec![
                (NodeId::new(0), NodeId::new(2)),
                (NodeId::new(0), NodeId::new(3)),
                (NodeId::new(2), NodeId::new(3)),
            ],
        }
    }

    #[test]
    fn test_graph_base_with_hole() {
        let g = graph();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.node_bound(), 4);
        assert!(g.contains_node(NodeId::new(2)));
        assert!(!g.contains_node(NodeId::new(1)));
        assert_eq!(
            g.node_ids().collect::<Vec<_>>(),
            vec![NodeId::new(0), NodeId::new(2), NodeId::new(3)]
        );
    }

    #[test]
    fn test_degrees() {
        let g = graph();
        assert_eq!(g.out_degree(NodeId::new(0)), 2);
        assert_eq!(g.in_degree(NodeId::new(3)), 2);
        assert_eq!(g.in_degree(NodeId::new(0)), 0);
        assert_eq!(g.out_degree(NodeId::new(1)), 0);
    }
}
