//! Graph algorithms for control flow structuring.
//!
//! # Available Algorithms
//!
//! ## Traversal
//!
//! - [`depth_first`] - DFS with pre- and post-visit callbacks
//! - [`dfs`] - Depth-first pre-order iterator
//! - [`postorder`] / [`reverse_postorder`] - Collected DFS orders
//! - [`DfsNumbering`] - Pre, post and reverse-post numbers
//!
//! ## Dominator Analysis
//!
//! - [`compute_dominators`] - Iterative dominator computation (Cooper, Harvey, Kennedy)
//! - [`DominatorTree`] - Result of dominator computation, including common dominators
//!
//! # Algorithm Selection
//!
//! | Algorithm | Time Complexity | Use Case |
//! |-----------|-----------------|----------|
//! | DFS | O(V + E) | Reachability, numbering |
//! | Dominators | O(V · E) worst case | Hammock predicates, follow nodes |

mod dominators;
mod traversal;

pub use dominators::{compute_dominators, DominatorIterator, DominatorTree};
pub use traversal::{depth_first, dfs, postorder, reverse_postorder, DfsIterator, DfsNumbering};
