//! Depth-first traversal and DFS numbering.
//!
//! Every traversal here follows successors in the order the graph yields them,
//! which for a [`Cfg`](crate::analysis::Cfg) is the deterministic `(cond, label)`
//! order. The numbering computed by [`DfsNumbering`] is therefore a pure function
//! of the graph's contents.
//!
//! # Algorithms
//!
//! - [`depth_first`] - DFS with pre- and post-visit callbacks
//! - [`dfs`] - Lazy depth-first pre-order iterator
//! - [`postorder`] - Nodes in DFS post-order
//! - [`reverse_postorder`] - Nodes in reverse post-order (each node before its
//!   successors, back-edges aside)
//! - [`DfsNumbering`] - Pre, post and reverse-post numbers per node
//!
//! All traversals are iterative, so deep graphs cannot overflow the call stack.

use crate::utils::graph::{NodeId, Successors};

/// Lazy depth-first pre-order iterator.
///
/// Unlike a plain worklist walk, this iterator keeps one frame per node on the
/// current DFS path, so the yielded order is the true DFS pre-order: a node is
/// produced right before the first of its not-yet-visited successors.
///
/// # Type Parameters
///
/// * `'g` - Lifetime of the graph reference
/// * `G` - Graph type implementing [`Successors`]
pub struct DfsIterator<'g, G: Successors> {
    graph: &'g G,
    pending: Option<NodeId>,
    stack: Vec<(Vec<NodeId>, usize)>,
    visited: Vec<bool>,
}

impl<'g, G: Successors> DfsIterator<'g, G> {
    fn new(graph: &'g G, start: NodeId) -> Self {
        let bound = graph.node_bound();
        if start.index() >= bound || !graph.contains_node(start) {
            return DfsIterator {
                graph,
                pending: None,
                stack: Vec::new(),
                visited: Vec::new(),
            };
        }

        let mut visited = vec![false; bound];
        visited[start.index()] = true;

        DfsIterator {
            graph,
            pending: Some(start),
            stack: Vec::new(),
            visited,
        }
    }
}

impl<G: Successors> Iterator for DfsIterator<'_, G> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(start) = self.pending.take() {
            self.stack.push((self.graph.successors(start).collect(), 0));
            return Some(start);
        }

        loop {
            let (succs, pos) = self.stack.last_mut()?;
            if *pos >= succs.len() {
                self.stack.pop();
                continue;
            }

            let succ = succs[*pos];
            *pos += 1;
            if succ.index() < self.visited.len() && !self.visited[succ.index()] {
                self.visited[succ.index()] = true;
                self.stack.push((self.graph.successors(succ).collect(), 0));
                return Some(succ);
            }
        }
    }
}

/// Returns a depth-first pre-order iterator starting from the given node.
///
/// Nodes not reachable from `start` are not visited. An absent start yields nothing.
///
/// # Complexity
///
/// - Time: O(V + E)
/// - Space: O(V)
pub fn dfs<G: Successors>(graph: &G, start: NodeId) -> DfsIterator<'_, G> {
    DfsIterator::new(graph, start)
}

/// Runs a depth-first search from `start`, calling `pre` when a node is first
/// reached and `post` once all of its successors are finished.
///
/// Each node reachable from `start` is visited exactly once. Successors are
/// explored in graph order. Pass `|_| {}` for a callback that is not needed.
///
/// # Arguments
///
/// * `graph` - The graph to traverse
/// * `start` - The starting node
/// * `pre` - Pre-visit callback
/// * `post` - Post-visit callback
pub fn depth_first<G, Pre, Post>(graph: &G, start: NodeId, mut pre: Pre, mut post: Post)
where
    G: Successors,
    Pre: FnMut(NodeId),
    Post: FnMut(NodeId),
{
    let bound = graph.node_bound();
    if start.index() >= bound || !graph.contains_node(start) {
        return;
    }

    let mut visited = vec![false; bound];
    // One frame per node on the current DFS path: (node, successors, next successor)
    let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> = Vec::new();

    visited[start.index()] = true;
    pre(start);
    stack.push((start, graph.successors(start).collect(), 0));

    while let Some((node, succs, pos)) = stack.last_mut() {
        if *pos < succs.len() {
            let succ = succs[*pos];
            *pos += 1;
            if succ.index() < bound && !visited[succ.index()] {
                visited[succ.index()] = true;
                pre(succ);
                let next = graph.successors(succ).collect();
                stack.push((succ, next, 0));
            }
        } else {
            let done = *node;
            stack.pop();
            post(done);
        }
    }
}

/// Computes the postorder traversal of nodes reachable from the start.
///
/// In postorder, a node is produced after all of its DFS descendants.
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut result = Vec::with_capacity(graph.node_count());
    depth_first(graph, start, |_| {}, |n| result.push(n));
    result
}

/// Computes the reverse postorder of nodes reachable from the start.
///
/// Reverse postorder places every node before its successors, except along
/// back-edges. It is the iteration order of the dominator computation and of the
/// interval passes.
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut order = postorder(graph, start);
    order.reverse();
    order
}

/// Pre-, post- and reverse-post numbers of every node reachable from a start node.
///
/// Numbers are 0-based. For a node `n`, `rev_post_num(n) = count - 1 - post_num(n)`,
/// so the start node always has reverse-post number 0. Unreachable nodes have no
/// numbers at all.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::Cfg;
/// use restructure::utils::graph::algorithms::DfsNumbering;
///
/// let cfg = Cfg::from_dot("digraph { A [entry=true]; A -> B; B -> C }").unwrap();
/// let a = cfg.node_with_label("A").unwrap();
/// let c = cfg.node_with_label("C").unwrap();
///
/// let numbering = DfsNumbering::compute(&cfg, a);
/// assert_eq!(numbering.rev_post_num(a), Some(0));
/// assert_eq!(numbering.rev_post_num(c), Some(2));
/// assert_eq!(numbering.post_num(c), Some(0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DfsNumbering {
    pre: Vec<Option<usize>>,
    post: Vec<Option<usize>>,
    rev_post: Vec<Option<usize>>,
    /// Nodes in reverse post-order
    order: Vec<NodeId>,
}

impl DfsNumbering {
    /// Numbers every node reachable from `start`.
    pub fn compute<G: Successors>(graph: &G, start: NodeId) -> Self {
        let bound = graph.node_bound();
        let mut pre = vec![None; bound];
        let mut post = vec![None; bound];
        let mut postorder = Vec::with_capacity(graph.node_count());
        let mut pre_counter = 0usize;

        depth_first(
            graph,
            start,
            |n| {
                pre[n.index()] = Some(pre_counter);
                pre_counter += 1;
            },
            |n| {
                post[n.index()] = Some(postorder.len());
                postorder.push(n);
            },
        );

        let count = postorder.len();
        let mut rev_post = vec![None; bound];
        for (post_num, node) in postorder.iter().enumerate() {
            rev_post[node.index()] = Some(count - 1 - post_num);
        }
        postorder.reverse();

        DfsNumbering {
            pre,
            post,
            rev_post,
            order: postorder,
        }
    }

    /// Returns the pre-order number of `node`, if it was reached.
    #[must_use]
    pub fn pre_num(&self, node: NodeId) -> Option<usize> {
        self.pre.get(node.index()).copied().flatten()
    }

    /// Returns the post-order number of `node`, if it was reached.
    #[must_use]
    pub fn post_num(&self, node: NodeId) -> Option<usize> {
        self.post.get(node.index()).copied().flatten()
    }

    /// Returns the reverse-post-order number of `node`, if it was reached.
    #[must_use]
    pub fn rev_post_num(&self, node: NodeId) -> Option<usize> {
        self.rev_post.get(node.index()).copied().flatten()
    }

    /// Returns the reached nodes in reverse post-order.
    #[must_use]
    pub fn reverse_postorder(&self) -> &[NodeId] {
        &self.order
    }

    /// Returns the number of reached nodes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if `node` was reached from the start.
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.pre_num(node).is_some()
    }
}
