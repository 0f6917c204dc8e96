//! The control flow graph model.
//!
//! A [`Cfg`] is an arena of labelled basic blocks ([`Node`]) connected by
//! attributed edges ([`Edge`]), with a distinguished entry. It is the single
//! graph type of the crate: input graphs, graphs rewritten by the hammock
//! driver and the derived graphs of interval analysis are all `Cfg` values.
//!
//! # Key Components
//!
//! - [`Cfg`] - The graph, with deterministic node, successor and predecessor order
//! - [`Node`] / [`StructInfo`] - A basic block and its structuring annotations
//! - [`Edge`] / [`BranchKind`] - An edge and the branch it represents
//! - [`merge`] - Collapses the blocks of a primitive into one node
//!
//! # Building Graphs
//!
//! Graphs come from DOT ([`Cfg::from_dot`]), from front-end blocks
//! ([`Cfg::from_blocks`]) or are assembled node by node:
//!
//! ```rust
//! use restructure::analysis::{Cfg, IrBlock, Terminator};
//!
//! let from_dot = Cfg::from_dot(r#"
//!     digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> C }
//! "#).unwrap();
//!
//! let from_blocks = Cfg::from_blocks("", &[
//!     IrBlock::new("A", Terminator::Branch { if_true: "B".into(), if_false: "C".into() }),
//!     IrBlock::new("B", Terminator::Jump("C".into())),
//!     IrBlock::new("C", Terminator::Return),
//! ]).unwrap();
//!
//! assert_eq!(from_dot, from_blocks);
//! ```
//!
//! # Edge Conditions
//!
//! The `cond` attribute of an edge classifies it:
//!
//! - **`true` / `false`**: the two sides of a 2-way branch
//! - **case expression**: a switch case, e.g. `"3"` or `"1, 4"`
//! - **`default`**: the switch default
//! - **absent**: an unconditional edge
//!
//! Successors are always enumerated in that order, see [`BranchKind`].

mod builder;
mod dot;
mod edge;
mod graph;
mod merge;
mod node;

pub use builder::{IrBlock, Terminator};
pub use edge::{BranchKind, Edge, EdgeId};
pub use graph::Cfg;
pub use merge::merge;
pub use node::{
    Attrs, CondExpr, LoopType, Node, StructInfo, ATTR_COND, ATTR_COND_NODE, ATTR_ENTRY,
};
