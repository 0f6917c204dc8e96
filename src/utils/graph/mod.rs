//! Graph infrastructure shared by both structuring strategies.
//!
//! - [`NodeId`] - Strongly-typed arena index
//! - [`GraphBase`], [`Successors`], [`Predecessors`] - The narrow interface every
//!   algorithm is written against
//! - [`algorithms`] - Traversals, DFS numbering and dominator trees
//!
//! The only implementor in this crate is [`Cfg`](crate::analysis::Cfg); derived
//! graphs of the interval analysis are `Cfg` values as well.

pub mod algorithms;
mod node;
mod traits;

pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, Successors};
