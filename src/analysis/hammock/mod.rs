//! Structuring by hammock matching.
//!
//! The driver repeatedly looks for the first single-entry, single-exit region
//! matching one of the [`patterns`], records it as a [`Primitive`] and merges
//! the region into one node. It stops when one node is left, or when nothing
//! matches any more; the latter is reported as [`Incomplete`] together with
//! everything recovered up to that point.
//!
//! # Observing Merges
//!
//! A [`MergeObserver`] sees the graph before and after every merge and may
//! stop the driver by returning [`ControlFlow::Break`]. The library never logs
//! by itself; observers are the hook for logging, DOT dumps or step limits.
//!
//! # Examples
//!
//! ```rust
//! use restructure::analysis::{analyze_hammock, Cfg};
//! use restructure::primitive::Primitive;
//!
//! let mut cfg = Cfg::from_dot(r#"
//!     digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> A }
//! "#).unwrap();
//!
//! let analysis = analyze_hammock(&mut cfg).unwrap();
//! assert!(analysis.is_complete());
//! assert_eq!(
//!     analysis.primitives,
//!     vec![Primitive::PreLoop { cond: "A".into(), body: "B".into(), exit: "C".into() }]
//! );
//! ```

pub mod patterns;

use std::ops::ControlFlow;

use crate::{
    analysis::cfg::{merge, Cfg},
    primitive::Primitive,
    utils::graph::GraphBase,
    Error, Result,
};

pub use patterns::find_primitive;

/// Callbacks around every merge of the hammock driver.
///
/// Both methods default to continuing. Returning [`ControlFlow::Break`] from
/// `before` cancels the driver without applying the merge; from `after` it
/// cancels once the merge is done and the primitive recorded.
pub trait MergeObserver {
    /// Called with the graph as it is before `primitive` is merged.
    fn before(&mut self, _cfg: &Cfg, _primitive: &Primitive) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called with the graph as it is after `primitive` was merged.
    fn after(&mut self, _cfg: &Cfg, _primitive: &Primitive) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MergeObserver for NoopObserver {}

impl<O: MergeObserver + ?Sized> MergeObserver for &mut O {
    fn before(&mut self, cfg: &Cfg, primitive: &Primitive) -> ControlFlow<()> {
        (**self).before(cfg, primitive)
    }

    fn after(&mut self, cfg: &Cfg, primitive: &Primitive) -> ControlFlow<()> {
        (**self).after(cfg, primitive)
    }
}

/// Why a driver run ended before the graph was reduced to one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incomplete {
    /// Nodes left in the graph
    pub remaining: usize,
    /// An observer stopped the run; otherwise no pattern matched
    pub cancelled: bool,
}

/// Result of a hammock run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Primitives in the order they were merged
    pub primitives: Vec<Primitive>,
    /// Set if the graph was not reduced to a single node
    pub incomplete: Option<Incomplete>,
}

impl Analysis {
    /// Returns `true` if the graph was reduced to a single node.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_none()
    }

    /// Converts a partial result into [`Error::Incomplete`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Incomplete`], carrying the recovered primitives, if the
    /// run did not complete.
    pub fn into_result(self) -> Result<Vec<Primitive>> {
        match self.incomplete {
            None => Ok(self.primitives),
            Some(incomplete) => Err(Error::Incomplete {
                recovered: self.primitives,
                remaining: incomplete.remaining,
            }),
        }
    }
}

/// Outcome of a single driver step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A primitive was merged
    Merged(Primitive),
    /// The graph is down to one node
    Done,
    /// No pattern matches the remaining graph
    Stuck,
    /// The observer stopped the driver
    Cancelled,
}

/// Fixed-point driver of the hammock method.
///
/// [`HammockDriver::run`] is what [`analyze_hammock_with`] calls;
/// [`HammockDriver::step`] applies one merge at a time.
pub struct HammockDriver<'g, O: MergeObserver> {
    cfg: &'g mut Cfg,
    observer: O,
    primitives: Vec<Primitive>,
}

impl<'g, O: MergeObserver> HammockDriver<'g, O> {
    /// Validates `cfg` and prepares a driver over it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCfg`] if the graph has no entry or unreachable nodes.
    pub fn new(cfg: &'g mut Cfg, observer: O) -> Result<Self> {
        cfg.validate()?;
        Ok(HammockDriver {
            cfg,
            observer,
            primitives: Vec::new(),
        })
    }

    /// Returns the graph in its current state.
    #[must_use]
    pub fn cfg(&self) -> &Cfg {
        self.cfg
    }

    /// Returns the primitives merged so far.
    #[must_use]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Finds and merges the next primitive.
    ///
    /// # Errors
    ///
    /// Propagates errors of the merge; the graph is unchanged in that case.
    pub fn step(&mut self) -> Result<Step> {
        if self.cfg.node_count() <= 1 {
            return Ok(Step::Done);
        }

        let dom = self.cfg.dominators()?;
        let Some(primitive) = find_primitive(self.cfg, &dom) else {
            return Ok(Step::Stuck);
        };

        if self.observer.before(self.cfg, &primitive).is_break() {
            return Ok(Step::Cancelled);
        }
        merge(self.cfg, &primitive)?;
        self.primitives.push(primitive.clone());
        if self.observer.after(self.cfg, &primitive).is_break() {
            return Ok(Step::Cancelled);
        }
        Ok(Step::Merged(primitive))
    }

    /// Runs until the graph is a single node, nothing matches, or the observer
    /// cancels.
    ///
    /// # Errors
    ///
    /// Propagates errors of the merge.
    pub fn run(mut self) -> Result<Analysis> {
        let cancelled = loop {
            match self.step()? {
                Step::Merged(_) => {}
                Step::Done => break None,
                Step::Stuck => break Some(false),
                Step::Cancelled => break Some(true),
            }
        };

        let incomplete = cancelled.map(|cancelled| Incomplete {
            remaining: self.cfg.node_count(),
            cancelled,
        });
        Ok(Analysis {
            primitives: self.primitives,
            incomplete,
        })
    }
}

/// Structures `cfg` with the hammock method.
///
/// `cfg` is reduced in place; on an incomplete run it holds the residual graph.
///
/// # Errors
///
/// Returns [`Error::InvalidCfg`] for an invalid graph, before anything is changed.
pub fn analyze_hammock(cfg: &mut Cfg) -> Result<Analysis> {
    analyze_hammock_with(cfg, NoopObserver)
}

/// Structures `cfg` with the hammock method, reporting every merge to `observer`.
///
/// # Errors
///
/// Returns [`Error::InvalidCfg`] for an invalid graph, before anything is changed.
pub fn analyze_hammock_with<O: MergeObserver>(cfg: &mut Cfg, observer: O) -> Result<Analysis> {
    HammockDriver::new(cfg, observer)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        before: Vec<(usize, Primitive)>,
        after: Vec<(usize, Primitive)>,
        stop_after: Option<usize>,
    }

    impl MergeObserver for Recorder {
        fn before(&mut self, cfg: &Cfg, primitive: &Primitive) -> ControlFlow<()> {
            self.before.push((cfg.node_count(), primitive.clone()));
            ControlFlow::Continue(())
        }

        fn after(&mut self, cfg: &Cfg, primitive: &Primitive) -> ControlFlow<()> {
            self.after.push((cfg.node_count(), primitive.clone()));
            match self.stop_after {
                Some(n) if self.after.len() >= n => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        }
    }

    const SEQ_IF: &str = "digraph { E [entry=true]; E -> F; E -> H; F -> G; G -> H }";

    #[test]
    fn test_sequence_then_if() {
        let mut cfg = Cfg::from_dot(SEQ_IF).unwrap();
        let analysis = analyze_hammock(&mut cfg).unwrap();
        assert!(analysis.is_complete());
        assert_eq!(
            analysis.primitives,
            vec![
                Primitive::Seq {
                    entry: "F".into(),
                    exit: "G".into()
                },
                Primitive::If {
                    cond: "E".into(),
                    body: "F".into(),
                    exit: "H".into()
                },
            ]
        );
        assert_eq!(cfg.node_count(), 1);
        assert_eq!(cfg.entry(), cfg.node_with_label("E"));
    }

    #[test]
    fn test_observer_sees_every_merge() {
        let mut cfg = Cfg::from_dot(SEQ_IF).unwrap();
        let mut recorder = Recorder::default();
        let analysis = analyze_hammock_with(&mut cfg, &mut recorder).unwrap();

        assert!(analysis.is_complete());
        let counts: Vec<_> = recorder.before.iter().map(|(n, _)| *n).collect();
        assert_eq!(counts, vec![4, 3]);
        let counts: Vec<_> = recorder.after.iter().map(|(n, _)| *n).collect();
        assert_eq!(counts, vec![3, 1]);
        assert_eq!(recorder.after[1].1, analysis.primitives[1]);
    }

    #[test]
    fn test_observer_cancels() {
        let mut cfg = Cfg::from_dot(SEQ_IF).unwrap();
        let recorder = Recorder {
            stop_after: Some(1),
            ..Recorder::default()
        };
        let analysis = analyze_hammock_with(&mut cfg, recorder).unwrap();
        assert_eq!(analysis.primitives.len(), 1);
        assert_eq!(
            analysis.incomplete,
            Some(Incomplete {
                remaining: 3,
                cancelled: true
            })
        );
    }

    #[test]
    fn test_incomplete_on_irreducible_graph() {
        let mut cfg = Cfg::from_dot(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> C; C -> B }",
        )
        .unwrap();
        let before = cfg.clone();
        let analysis = analyze_hammock(&mut cfg).unwrap();
        assert!(analysis.primitives.is_empty());
        assert_eq!(
            analysis.incomplete,
            Some(Incomplete {
                remaining: 3,
                cancelled: false
            })
        );
        assert_eq!(cfg, before);

        match analysis.into_result() {
            Err(Error::Incomplete { recovered, remaining }) => {
                assert!(recovered.is_empty());
                assert_eq!(remaining, 3);
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_do_while_through_sequence() {
        let mut cfg = Cfg::from_dot(
            "digraph { A [entry=true]; A -> B; B -> A [cond=true]; B -> C [cond=false] }",
        )
        .unwrap();
        let primitives = analyze_hammock(&mut cfg).unwrap().into_result().unwrap();
        assert_eq!(
            primitives,
            vec![
                Primitive::Seq {
                    entry: "A".into(),
                    exit: "B".into()
                },
                Primitive::PostLoop {
                    cond: "A".into(),
                    exit: "C".into()
                },
            ]
        );
    }

    #[test]
    fn test_invalid_graph_is_rejected_untouched() {
        let mut cfg = Cfg::from_dot("digraph { A -> B }").unwrap();
        let before = cfg.clone();
        assert!(matches!(
            analyze_hammock(&mut cfg),
            Err(Error::InvalidCfg { .. })
        ));
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_single_node_is_complete() {
        let mut cfg = Cfg::from_dot("digraph { A [entry=true] }").unwrap();
        let analysis = analyze_hammock(&mut cfg).unwrap();
        assert!(analysis.is_complete());
        assert!(analysis.primitives.is_empty());
    }

    #[test]
    fn test_step_by_step() {
        let mut cfg = Cfg::from_dot(SEQ_IF).unwrap();
        let mut driver = HammockDriver::new(&mut cfg, NoopObserver).unwrap();
        assert!(matches!(driver.step().unwrap(), Step::Merged(Primitive::Seq { .. })));
        assert_eq!(driver.cfg().node_count(), 3);
        assert!(matches!(driver.step().unwrap(), Step::Merged(Primitive::If { .. })));
        assert_eq!(driver.step().unwrap(), Step::Done);
        assert_eq!(driver.primitives().len(), 2);
    }
}
