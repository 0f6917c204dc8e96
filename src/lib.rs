// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # restructure
//!
//! Control flow structuring for decompilers. Given the control flow graph of a
//! function, `restructure` recovers the high-level constructs a back-end needs
//! to emit readable source: sequences, `if` / `if .. else`, `while`,
//! `do .. while`, endless loops, `switch` and short-circuit conditions.
//!
//! ## Features
//!
//! - **Two strategies** - Hammock matching that reduces the graph region by region,
//!   and Cifuentes-style interval analysis that annotates it
//! - **Deterministic** - Node, successor and predecessor order never depend on hashing
//!   or insertion order, so equal inputs give equal outputs
//! - **Observable** - Every hammock merge can be watched, logged or cancelled
//! - **Interchange formats** - Graphs in and out as DOT, primitives as JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use restructure::prelude::*;
//!
//! let mut cfg = Cfg::from_dot(r#"
//!     digraph f {
//!         A [entry=true];
//!         A -> B [cond=true];
//!         A -> C [cond=false];
//!         B -> D;
//!         C -> D;
//!     }
//! "#)?;
//!
//! let analysis = analyze_hammock(&mut cfg)?;
//! assert!(analysis.is_complete());
//! assert_eq!(analysis.primitives[0].kind(), PrimitiveKind::IfElse);
//! # Ok::<(), restructure::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`analysis`] - The graph model, both structuring drivers and their passes
//! - [`primitive`] - Records describing recognised structures, and their JSON form
//! - [`utils`] - Generic graph traits and algorithms, natural ordering, DOT lexing
//! - [`Error`] and [`Result`] - Error handling
//!
//! The library performs no I/O and never logs; callers observe the hammock
//! driver through [`analysis::MergeObserver`].

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use restructure::prelude::*;
///
/// let mut cfg = Cfg::from_dot("digraph { A [entry=true]; A -> B }")?;
/// let primitives = analyze_intervals(&mut cfg)?;
/// assert!(primitives.is_empty());
/// # Ok::<(), restructure::Error>(())
/// ```
pub mod prelude;

/// Control flow graphs and their structuring.
///
/// # Key Components
///
/// - [`analysis::Cfg`] - The graph every algorithm works on
/// - [`analysis::analyze_hammock`] - Structuring by iterative region merging
/// - [`analysis::analyze_intervals`] - Structuring by interval analysis
/// - [`analysis::derived_sequence`] - The derived sequence of graphs
/// - [`analysis::Strategy`] / [`analysis::analyze_all`] - Strategy selection and batch runs
pub mod analysis;

/// Recognised control flow structures.
///
/// A [`primitive::Primitive`] names the blocks playing each role of one
/// structure. The JSON codec in [`primitive::to_json`] / [`primitive::from_json`]
/// is the interchange format with back-ends.
pub mod primitive;

/// Utilities shared by the graph model and the algorithms.
pub mod utils;

/// `restructure` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `restructure` Error type
///
/// # Examples
///
/// ```rust
/// use restructure::{analysis::Cfg, Error};
///
/// match Cfg::from_dot("graph { A -- B }") {
///     Err(Error::NotImplemented(what)) => println!("unsupported: {what}"),
///     Err(Error::DotSyntax { line, message }) => println!("line {line}: {message}"),
///     Err(e) => println!("error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
pub use error::Error;
