//! Interval-based structuring.
//!
//! Instead of rewriting the graph region by region, interval analysis
//! annotates the nodes of the input graph in four passes:
//!
//! 1. short-circuit conditions are contracted into their outer block
//! 2. n-way conditionals get their follow
//! 3. loops are found on the derived sequence and get kind, follow and members
//! 4. 2-way conditionals get their follow
//!
//! The back-end reads the results from [`StructInfo`](crate::analysis::StructInfo);
//! the returned primitives describe the same findings as records.
//!
//! # Examples
//!
//! ```rust
//! use restructure::analysis::{analyze_intervals, Cfg, LoopType};
//! use restructure::primitive::PrimitiveKind;
//!
//! let mut cfg = Cfg::from_dot(r#"
//!     digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> A }
//! "#).unwrap();
//! let primitives = analyze_intervals(&mut cfg).unwrap();
//! assert_eq!(primitives[0].kind(), PrimitiveKind::PreLoop);
//!
//! let a = cfg.node_with_label("A").unwrap();
//! assert_eq!(cfg.info(a).unwrap().loop_type, LoopType::Pre);
//! ```

mod compcond;
mod decompose;
mod loops;
mod nway;
mod twoway;

pub use decompose::{derived_sequence, intervals, DerivedSequence, Interval};

use crate::{analysis::cfg::Cfg, primitive::Primitive, utils::graph::NodeId, Result};

/// Conditional headers still waiting for a follow.
#[derive(Debug, Default)]
pub(crate) struct Unresolved(Vec<NodeId>);

impl Unresolved {
    pub(crate) fn push(&mut self, header: NodeId) {
        self.0.push(header);
    }

    /// Sets `follow` on `header` and on every waiting header, and returns them,
    /// `header` first.
    pub(crate) fn resolve(&mut self, cfg: &mut Cfg, header: NodeId, follow: NodeId) -> Vec<NodeId> {
        let mut resolved = vec![header];
        resolved.extend(self.0.drain(..).rev());
        for node in &resolved {
            if let Some(info) = cfg.info_mut(*node) {
                info.follow = Some(follow);
            }
        }
        resolved
    }
}

/// Runs the four interval passes on `cfg`.
///
/// Previous annotations are cleared first. The graph changes only through
/// compound-condition contraction, which removes the inner blocks; every
/// other finding is stored in the node annotations.
///
/// Primitives are returned pass by pass: compound conditions, switches, loops,
/// then 2-way conditionals.
///
/// # Errors
///
/// Returns [`Error::InvalidCfg`](crate::Error::InvalidCfg) if the graph has no
/// entry or unreachable nodes; the graph is left untouched in that case.
pub fn analyze_intervals(cfg: &mut Cfg) -> Result<Vec<Primitive>> {
    cfg.validate()?;
    cfg.reset_struct_info();

    let mut primitives = compcond::struct_comp_cond(cfg)?;
    primitives.extend(nway::struct_nway(cfg)?);
    primitives.extend(loops::loop_struct(cfg)?);
    primitives.extend(twoway::struct_2way(cfg)?);
    Ok(primitives)
}
