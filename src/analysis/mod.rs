//! Control flow structuring.
//!
//! This module holds the graph model and both structuring strategies:
//!
//! - [`cfg`] - The control flow graph, its codecs and [`merge`]
//! - [`hammock`] - Iterative matching and merging of single-entry, single-exit regions
//! - [`interval`] - Cifuentes-style interval analysis annotating the input graph
//!
//! # Choosing a Strategy
//!
//! The hammock driver rewrites the graph and yields primitives in merge order;
//! it gives up on irreducible regions. Interval analysis leaves the graph
//! intact except for contracted compound conditions and records its findings
//! in [`StructInfo`]. [`Strategy`] selects one by name, as the CLI does.
//!
//! ```rust
//! use restructure::analysis::{analyze, Cfg, Strategy};
//!
//! let dot = r#"digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> D; C -> D }"#;
//!
//! for name in ["hammock", "interval"] {
//!     let strategy: Strategy = name.parse().unwrap();
//!     let mut cfg = Cfg::from_dot(dot).unwrap();
//!     let analysis = analyze(&mut cfg, strategy).unwrap();
//!     assert!(analysis.is_complete());
//!     assert_eq!(analysis.primitives[0].entry(), "A");
//! }
//! ```

pub mod cfg;
pub mod hammock;
pub mod interval;

use rayon::prelude::*;
use strum::{Display, EnumIter, EnumString};

pub use cfg::{
    merge, Attrs, BranchKind, Cfg, CondExpr, Edge, EdgeId, IrBlock, LoopType, Node, StructInfo,
    Terminator,
};
pub use hammock::{
    analyze_hammock, analyze_hammock_with, Analysis, HammockDriver, Incomplete, MergeObserver,
    NoopObserver, Step,
};
pub use interval::{analyze_intervals, derived_sequence, intervals, DerivedSequence, Interval};

use crate::Result;

/// A structuring algorithm, parsed from its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Strategy {
    /// Iterative hammock matching and merging
    #[default]
    Hammock,
    /// Interval analysis over the derived sequence
    Interval,
}

/// Structures `cfg` with the given strategy.
///
/// Interval analysis always completes; its result carries no
/// [`Incomplete`] marker.
///
/// # Errors
///
/// Returns [`Error::InvalidCfg`](crate::Error::InvalidCfg) for malformed graphs
/// and propagates merge failures of the hammock driver.
pub fn analyze(cfg: &mut Cfg, strategy: Strategy) -> Result<Analysis> {
    match strategy {
        Strategy::Hammock => analyze_hammock(cfg),
        Strategy::Interval => Ok(Analysis {
            primitives: analyze_intervals(cfg)?,
            incomplete: None,
        }),
    }
}

/// Structures many graphs in parallel.
///
/// Each graph is owned by exactly one worker. Results are returned in input
/// order, each together with its structured graph.
pub fn analyze_all(graphs: Vec<Cfg>, strategy: Strategy) -> Vec<Result<(Cfg, Analysis)>> {
    graphs
        .into_par_iter()
        .map(|mut cfg| {
            let analysis = analyze(&mut cfg, strategy)?;
            Ok((cfg, analysis))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::utils::graph::GraphBase;

    const LOOP: &str = "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> A }";

    #[test]
    fn test_strategy_names() {
        assert_eq!("hammock".parse::<Strategy>().unwrap(), Strategy::Hammock);
        assert_eq!("interval".parse::<Strategy>().unwrap(), Strategy::Interval);
        assert!("cifuentes".parse::<Strategy>().is_err());
        for strategy in Strategy::iter() {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_strategies_differ_in_graph_effect() {
        let mut merged = Cfg::from_dot(LOOP).unwrap();
        analyze(&mut merged, Strategy::Hammock).unwrap();
        assert_eq!(merged.node_count(), 1);

        let mut annotated = Cfg::from_dot(LOOP).unwrap();
        analyze(&mut annotated, Strategy::Interval).unwrap();
        assert_eq!(annotated.node_count(), 3);
    }

    #[test]
    fn test_analyze_all_keeps_input_order() {
        let graphs = vec![
            Cfg::from_dot(LOOP).unwrap(),
            Cfg::from_dot("digraph { X }").unwrap(),
            Cfg::from_dot("digraph { S [entry=true]; S -> T }").unwrap(),
        ];
        let results = analyze_all(graphs, Strategy::Hammock);
        assert_eq!(results.len(), 3);

        let (cfg, analysis) = results[0].as_ref().unwrap();
        assert_eq!(cfg.node_count(), 1);
        assert_eq!(analysis.primitives.len(), 1);

        // No entry
        assert!(results[1].is_err());

        let (cfg, _) = results[2].as_ref().unwrap();
        assert_eq!(cfg.label(cfg.entry().unwrap()), "S");
    }
}
