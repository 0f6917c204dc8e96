//! Node identifier for arena-backed graphs.
//!
//! This module provides the [`NodeId`] type, a strongly-typed index into the node
//! arena of a graph. Graphs in this crate never reuse an id once the node it named
//! has been removed, so a stale `NodeId` can be detected rather than silently
//! aliasing a newer node.

use std::fmt;

/// A strongly-typed identifier for nodes within a graph arena.
///
/// `NodeId` wraps a `usize` index, providing type safety to prevent accidental
/// mixing of node indices with other integer values. Ids are assigned sequentially
/// starting from 0 as nodes are added; removing a node leaves a hole that is never
/// filled again.
///
/// # Usage
///
/// Node ids are handed out by [`Cfg::add_node`](crate::analysis::Cfg::add_node) and
/// should not typically be constructed manually. They are used to:
///
/// - Reference nodes when adding edges
/// - Store back-references such as a loop header or a follow node
/// - Index per-node analysis results (DFS numbers, dominators)
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::Cfg;
///
/// let mut cfg = Cfg::new("f");
/// let a = cfg.add_block("A").unwrap();
/// let b = cfg.add_block("B").unwrap();
/// assert_ne!(a, b);
/// assert!(a < b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new `NodeId` from a raw index value.
    ///
    /// Intended for internal use and testing. A `NodeId` built this way is only
    /// meaningful for a graph whose arena has a node at that index.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw index value of this node identifier.
    ///
    /// The index is a 0-based arena position that can be used to index vectors
    /// sized by [`GraphBase::node_bound`](crate::utils::graph::GraphBase::node_bound).
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(node: NodeId) -> Self {
        node.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn test_node_id_new() {
        let node = NodeId::new(42);
        assert_eq!(node.index(), 42);
    }

    #[test]
    fn test_node_id_ordering() {
        let mut nodes = vec![NodeId::new(3), NodeId::new(1), NodeId::new(2)];
        nodes.sort();
        assert_eq!(nodes, vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)]);
    }

    #[test]
    fn test_node_id_as_key() {
        let mut map: HashMap<NodeId, &str> = HashMap::new();
        map.insert(NodeId::new(1), "head");
        map.insert(NodeId::new(2), "latch");
        assert_eq!(map.get(&NodeId::new(1)), Some(&"head"));
        assert_eq!(map.get(&NodeId::new(3)), None);

        let set: BTreeSet<NodeId> = [NodeId::new(4), NodeId::new(0), NodeId::new(4)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_node_id_conversions() {
        let node: NodeId = 123usize.into();
        assert_eq!(node.index(), 123);
        let raw: usize = NodeId::new(789).into();
        assert_eq!(raw, 789);
    }

    #[test]
    fn test_node_id_formats() {
        let node = NodeId::new(42);
        assert_eq!(format!("{node:?}"), "NodeId(42)");
        assert_eq!(format!("{node}"), "n42");
    }
}
