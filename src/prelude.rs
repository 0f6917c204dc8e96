//! # restructure Prelude
//!
//! The types needed to load a graph, structure it and read the results.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all restructure operations
pub use crate::Error;

/// The result type used throughout restructure
pub use crate::Result;

// ================================================================================================
// Graph Model
// ================================================================================================

/// The control flow graph and its parts
pub use crate::analysis::{
    Attrs, BranchKind, Cfg, CondExpr, Edge, IrBlock, LoopType, Node, StructInfo, Terminator,
};

/// Node identifiers and the graph traits the algorithms are written against
pub use crate::utils::graph::{GraphBase, NodeId, Predecessors, Successors};

/// Dominator trees
pub use crate::utils::graph::algorithms::{compute_dominators, DominatorTree};

// ================================================================================================
// Structuring
// ================================================================================================

/// Strategy selection
pub use crate::analysis::{analyze, analyze_all, Strategy};

/// Hammock driver
pub use crate::analysis::{
    analyze_hammock, analyze_hammock_with, merge, Analysis, HammockDriver, Incomplete,
    MergeObserver, NoopObserver, Step,
};

/// Interval analysis
pub use crate::analysis::{analyze_intervals, derived_sequence, intervals, DerivedSequence, Interval};

// ================================================================================================
// Results
// ================================================================================================

/// Recognised structures and their JSON codec
pub use crate::primitive::{
    from_json, to_json, CompCondOp, LoopKind, Primitive, PrimitiveKind,
};
