//! Shared utilities.
//!
//! - [`graph`] - graph traits and the algorithms built on them
//! - [`natural_cmp`] - the natural ordering used for deterministic iteration
//! - [`escape_dot`], [`quote_id`] - DOT lexical helpers

mod dot;
pub mod graph;
mod natural;

pub use dot::{escape_dot, is_bare_id, is_keyword, quote_id, unescape_dot};
pub use natural::{natural_cmp, natural_sort};
