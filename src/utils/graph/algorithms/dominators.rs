//! Dominator tree computation.
//!
//! A node `d` **dominates** a node `n` if every path from the entry node to `n`
//! passes through `d`. The **immediate dominator** of `n` is the unique strict
//! dominator of `n` that is dominated by every other strict dominator of `n`.
//! Linking every node to its immediate dominator yields the dominator tree,
//! rooted at the entry.
//!
//! # Algorithm
//!
//! This implementation uses the iterative algorithm of Cooper, Harvey and
//! Kennedy ("A Simple, Fast Dominance Algorithm"). Nodes are processed in
//! reverse post-order and the immediate dominator of each node is refined by
//! intersecting the dominator chains of its processed predecessors until no
//! entry changes. On the small, mostly reducible graphs produced by compilers it
//! converges in two or three sweeps and beats Lengauer-Tarjan in practice.
//!
//! The structuring passes use the tree for three queries:
//!
//! - `dominates(x, y)` in the hammock predicates
//! - [`DominatorTree::children`] for the 2-way and n-way follow search
//! - [`DominatorTree::common_dominator`] for n-way headers with abnormal entries

use crate::utils::graph::{algorithms::reverse_postorder, NodeId, Predecessors, Successors};

/// Result of dominator tree computation.
///
/// Only nodes reachable from the entry take part in the tree. Queries about
/// unreachable or absent nodes answer `None` / `false` instead of panicking.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::Cfg;
/// use restructure::utils::graph::algorithms::compute_dominators;
///
/// let cfg = Cfg::from_dot(
///     "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> D; C -> D }",
/// ).unwrap();
/// let id = |l: &str| cfg.node_with_label(l).unwrap();
///
/// let dom_tree = compute_dominators(&cfg, id("A"));
/// assert_eq!(dom_tree.immediate_dominator(id("D")), Some(id("A")));
/// assert!(!dom_tree.dominates(id("B"), id("D")));
/// ```
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// The entry (root) node of the dominator tree
    entry: NodeId,
    /// Immediate dominator per node index; the entry maps to itself, unreachable nodes to `None`
    idom: Vec<Option<NodeId>>,
    /// Depth of each reachable node, the entry having depth 0
    depth: Vec<usize>,
    /// Children per node, in the graph's node order
    children: Vec<Vec<NodeId>>,
    /// Number of reachable nodes
    node_count: usize,
}

impl DominatorTree {
    /// Returns the entry (root) node of the dominator tree.
    #[inline]
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns `true` if `node` is reachable from the entry.
    #[inline]
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.idom.get(node.index()).is_some_and(Option::is_some)
    }

    /// Returns the immediate dominator of a node, or `None` for the entry node
    /// and for nodes not reachable from it.
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        if node == self.entry {
            None
        } else {
            self.idom.get(node.index()).copied().flatten()
        }
    }

    /// Checks if node `a` dominates node `b`.
    ///
    /// A reachable node dominates itself. Nothing dominates an unreachable node.
    ///
    /// # Complexity
    ///
    /// O(depth(b) - depth(a)).
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if !self.is_reachable(a) || !self.is_reachable(b) {
            return false;
        }

        let target = self.depth[a.index()];
        let mut current = b;
        while self.depth[current.index()] > target {
            match self.immediate_dominator(current) {
                Some(idom) => current = idom,
                None => return false,
            }
        }
        current == a
    }

    /// Checks if node `a` strictly dominates node `b`.
    #[inline]
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Returns an iterator over all dominators of a node, from the node itself
    /// up to and including the entry node.
    ///
    /// The iterator is empty for unreachable nodes.
    pub fn dominators(&self, node: NodeId) -> DominatorIterator<'_> {
        DominatorIterator {
            tree: self,
            current: self.is_reachable(node).then_some(node),
        }
    }

    /// Returns the depth of a node in the dominator tree, i.e. its distance from
    /// the root in immediate-dominator steps.
    ///
    /// The entry node has depth 0. Unreachable nodes report `None`.
    #[must_use]
    pub fn depth(&self, node: NodeId) -> Option<usize> {
        self.is_reachable(node).then(|| self.depth[node.index()])
    }

    /// Returns the children of a node in the dominator tree, i.e. the nodes it
    /// immediately dominates, in the graph's deterministic node order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children
            .get(node.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the nearest node that dominates every node of `nodes`.
    ///
    /// All nodes are first lifted to the smallest depth among them, then stepped
    /// up together until they coincide. Returns `None` for an empty set or when a
    /// node is unreachable.
    #[must_use]
    pub fn common_dominator(&self, nodes: &[NodeId]) -> Option<NodeId> {
        if nodes.is_empty() {
            return None;
        }

        let mut current = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if !self.is_reachable(node) {
                return None;
            }
            current.push(node);
        }

        let min_depth = current
            .iter()
            .map(|n| self.depth[n.index()])
            .min()
            .unwrap_or(0);
        for node in &mut current {
            while self.depth[node.index()] > min_depth {
                *node = self.immediate_dominator(*node)?;
            }
        }

        while current.iter().any(|n| *n != current[0]) {
            for node in &mut current {
                *node = self.immediate_dominator(*node)?;
            }
        }
        Some(current[0])
    }

    /// Returns the number of nodes in the dominator tree.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

/// Iterator over dominators of a node, from the node up to the entry.
pub struct DominatorIterator<'a> {
    tree: &'a DominatorTree,
    current: Option<NodeId>,
}

impl Iterator for DominatorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.immediate_dominator(current);
        Some(current)
    }
}

/// Computes the dominator tree of the nodes reachable from `entry`.
///
/// # Arguments
///
/// * `graph` - The graph to analyze
/// * `entry` - The root of the tree
///
/// # Complexity
///
/// - Time: O(V · E) worst case, near-linear on reducible graphs
/// - Space: O(V)
pub fn compute_dominators<G>(graph: &G, entry: NodeId) -> DominatorTree
where
    G: Successors + Predecessors,
{
    let bound = graph.node_bound();
    let rpo = reverse_postorder(graph, entry);

    let mut rpo_num: Vec<Option<usize>> = vec![None; bound];
    for (i, node) in rpo.iter().enumerate() {
        rpo_num[node.index()] = Some(i);
    }

    let mut idom: Vec<Option<NodeId>> = vec![None; bound];
    if let Some(&root) = rpo.first() {
        idom[root.index()] = Some(root);
    }

    let intersect = |idom: &[Option<NodeId>], mut a: NodeId, mut b: NodeId| -> Option<NodeId> {
        while a != b {
            while rpo_num[a.index()]? > rpo_num[b.index()]? {
                a = idom[a.index()]?;
            }
            while rpo_num[b.index()]? > rpo_num[a.index()]? {
                b = idom[b.index()]?;
            }
        }
        Some(a)
    };

    let mut changed = true;
    while changed {
        changed = false;
        for &node in rpo.iter().skip(1) {
            let mut new_idom: Option<NodeId> = None;
            for pred in graph.predecessors(node) {
                if pred.index() >= bound || idom[pred.index()].is_none() {
                    continue;
                }
                new_idom = match new_idom {
                    None => Some(pred),
                    Some(current) => intersect(&idom, pred, current),
                };
            }

            if new_idom.is_some() && idom[node.index()] != new_idom {
                idom[node.index()] = new_idom;
                changed = true;
            }
        }
    }

    // Depths follow reverse post-order: an immediate dominator always precedes its children
    let mut depth = vec![0usize; bound];
    for &node in rpo.iter().skip(1) {
        if let Some(parent) = idom[node.index()] {
            depth[node.index()] = depth[parent.index()] + 1;
        }
    }

    let mut children = vec![Vec::new(); bound];
    for node in graph.node_ids() {
        if node == entry || node.index() >= bound {
            continue;
        }
        if let Some(parent) = idom[node.index()] {
            children[parent.index()].push(node);
        }
    }

    DominatorTree {
        entry,
        idom,
        depth,
        children,
        node_count: rpo.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Cfg;

    fn cfg(dot: &str) -> Cfg {
        Cfg::from_dot(dot).unwrap()
    }

    #[test]
    fn test_dominator_single_node() {
        let g = cfg("digraph { A [entry=true] }");
        let entry = g.entry().unwrap();
        let dom_tree = compute_dominators(&g, entry);

        assert_eq!(dom_tree.entry(), entry);
        assert_eq!(dom_tree.immediate_dominator(entry), None);
        assert!(dom_tree.dominates(entry, entry));
        assert_eq!(dom_tree.depth(entry), Some(0));
        assert_eq!(dom_tree.node_count(), 1);
    }

    #[test]
    fn test_dominator_linear_chain() {
        let g = cfg("digraph { A [entry=true]; A -> B -> C -> D }");
        let id = |l: &str| g.node_with_label(l).unwrap();
        let dom_tree = compute_dominators(&g, id("A"));

        assert_eq!(dom_tree.immediate_dominator(id("B")), Some(id("A")));
        assert_eq!(dom_tree.immediate_dominator(id("C")), Some(id("B")));
        assert_eq!(dom_tree.immediate_dominator(id("D")), Some(id("C")));
        assert!(dom_tree.dominates(id("B"), id("D")));
        assert!(!dom_tree.dominates(id("D"), id("B")));
        assert_eq!(dom_tree.depth(id("D")), Some(3));
    }

    #[test]
    fn test_dominator_diamond() {
        let g = cfg(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> D; C -> D }",
        );
        let id = |l: &str| g.node_with_label(l).unwrap();
        let dom_tree = compute_dominators(&g, id("A"));

        assert_eq!(dom_tree.immediate_dominator(id("D")), Some(id("A")));
        assert!(!dom_tree.strictly_dominates(id("B"), id("D")));
        assert!(!dom_tree.strictly_dominates(id("C"), id("D")));
        assert_eq!(dom_tree.children(id("A")), &[id("B"), id("C"), id("D")]);
        assert!(dom_tree.children(id("B")).is_empty());
    }

    #[test]
    fn test_dominator_loop() {
        let g = cfg(
            "digraph { A [entry=true]; A -> B; B -> C [cond=true]; B -> D [cond=false]; C -> B }",
        );
        let id = |l: &str| g.node_with_label(l).unwrap();
        let dom_tree = compute_dominators(&g, id("A"));

        assert_eq!(dom_tree.immediate_dominator(id("B")), Some(id("A")));
        assert_eq!(dom_tree.immediate_dominator(id("C")), Some(id("B")));
        assert_eq!(dom_tree.immediate_dominator(id("D")), Some(id("B")));
        assert!(dom_tree.dominates(id("B"), id("C")));
    }

    #[test]
    fn test_dominator_irreducible() {
        // A -> B, A -> C, B <-> C: neither B nor C dominates the other
        let g = cfg(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> C; C -> B }",
        );
        let id = |l: &str| g.node_with_label(l).unwrap();
        let dom_tree = compute_dominators(&g, id("A"));

        assert_eq!(dom_tree.immediate_dominator(id("B")), Some(id("A")));
        assert_eq!(dom_tree.immediate_dominator(id("C")), Some(id("A")));
    }

    #[test]
    fn test_dominator_iterator() {
        let g = cfg("digraph { A [entry=true]; A -> B -> C }");
        let id = |l: &str| g.node_with_label(l).unwrap();
        let dom_tree = compute_dominators(&g, id("A"));

        let chain: Vec<NodeId> = dom_tree.dominators(id("C")).collect();
        assert_eq!(chain, vec![id("C"), id("B"), id("A")]);
    }

    #[test]
    fn test_unreachable_node() {
        let mut g = cfg("digraph { A [entry=true]; A -> B }");
        let z = g.add_block("Z").unwrap();
        let a = g.node_with_label("A").unwrap();
        let dom_tree = compute_dominators(&g, a);

        assert!(!dom_tree.is_reachable(z));
        assert!(!dom_tree.dominates(a, z));
        assert_eq!(dom_tree.depth(z), None);
        assert_eq!(dom_tree.dominators(z).count(), 0);
        assert_eq!(dom_tree.common_dominator(&[z]), None);
    }

    #[test]
    fn test_common_dominator() {
        // A -> B -> {C, D}; A -> E; D -> F; E -> F
        let g = cfg(
            r#"digraph {
                A [entry=true];
                A -> B [cond=true]; A -> E [cond=false];
                B -> C [cond=true]; B -> D [cond=false];
                D -> F; E -> F;
            }"#,
        );
        let id = |l: &str| g.node_with_label(l).unwrap();
        let dom_tree = compute_dominators(&g, id("A"));

        assert_eq!(dom_tree.common_dominator(&[id("C"), id("D")]), Some(id("B")));
        assert_eq!(dom_tree.common_dominator(&[id("C"), id("E")]), Some(id("A")));
        assert_eq!(dom_tree.common_dominator(&[id("C")]), Some(id("C")));
        assert_eq!(dom_tree.common_dominator(&[id("B"), id("C")]), Some(id("B")));
        assert_eq!(dom_tree.common_dominator(&[]), None);
    }
}
