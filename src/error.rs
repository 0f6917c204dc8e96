use thiserror::Error;

use crate::primitive::Primitive;

macro_rules! invalid_cfg {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidCfg {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidCfg {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Structuring itself is total on well-formed graphs, so most variants describe either a
/// malformed input graph or a primitive that no longer matches the graph it is applied to.
///
/// # Error Categories
///
/// ## Graph Errors
/// - [`Error::InvalidCfg`] - Missing or duplicate entry, duplicate label, dangling edge, unreachable node
/// - [`Error::UnknownNode`] - A primitive or merge names a label the graph does not contain
/// - [`Error::MergeFailed`] - A merge cannot be carried out on the current graph
///
/// ## Driver Outcomes
/// - [`Error::Incomplete`] - The hammock driver stopped before reducing the graph to one node
/// - [`Error::NotImplemented`] - A terminator kind or input construct that is not supported yet
///
/// ## Codec Errors
/// - [`Error::DotSyntax`] - The DOT reader rejected its input
/// - [`Error::Json`] - Primitive (de)serialisation failed
/// - [`Error::MalformedPrimitive`] - A decoded primitive lacks a role or has an extra one
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust
/// use restructure::{analysis::Cfg, Error};
///
/// match Cfg::from_dot("digraph { A -> B }") {
///     Ok(_) => println!("parsed"),
///     Err(Error::InvalidCfg { message, .. }) => eprintln!("invalid graph: {message}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The control flow graph violates a structural invariant.
    ///
    /// Raised for a missing or second entry node, a duplicate label, an edge that refers
    /// to a missing node, a parallel edge, or a node that cannot be reached from the entry
    /// when reachability is required. The source location where the violation was
    /// detected is recorded to ease debugging.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Invalid CFG - {file}:{line}: {message}")]
    InvalidCfg {
        /// The message to be printed for the InvalidCfg error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A primitive or merge references a node label that is not present in the graph.
    #[error("Unknown node - {0}")]
    UnknownNode(String),

    /// A merge could not proceed.
    ///
    /// Typically caused by a primitive that is inconsistent in itself (its entry is not
    /// one of its nodes) or that was computed against an earlier version of the graph.
    #[error("Merge failed - {0}")]
    MergeFailed(String),

    /// A driver terminated without fully reducing the graph.
    ///
    /// This is a structured outcome rather than a hard failure: the primitives recovered
    /// before the driver got stuck are carried along.
    #[error("Incomplete structuring - {remaining} nodes remain after {} primitives", recovered.len())]
    Incomplete {
        /// Primitives recovered before the driver stopped
        recovered: Vec<Primitive>,
        /// Number of nodes left in the residual graph
        remaining: usize,
    },

    /// A serialised primitive does not match the roles of its kind.
    #[error("Malformed primitive - {0}")]
    MalformedPrimitive(String),

    /// A construct the implementation does not recognise yet.
    ///
    /// Kept apart from correctness failures so that callers can decide to skip the
    /// offending function instead of aborting.
    #[error("Not implemented - {0}")]
    NotImplemented(String),

    /// The DOT reader encountered input it could not parse.
    #[error("DOT syntax error at line {line}: {message}")]
    DotSyntax {
        /// 1-based line of the offending token
        line: usize,
        /// Description of what was expected
        message: String,
    },

    /// JSON (de)serialisation error from the primitive codec.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
