pub mod common;
pub mod intervals;
pub mod structure;
