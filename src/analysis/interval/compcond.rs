//! Short-circuit condition contraction.
//!
//! Two chained 2-way blocks that share one target evaluate a compound
//! predicate, e.g. `if (a && b)`. The pass folds the inner block into the
//! outer one: the outer block keeps a [`CondExpr`] describing the combined
//! condition and branches directly to the two final targets.

use crate::{
    analysis::cfg::{BranchKind, Cfg, CondExpr},
    primitive::{CompCondOp, Primitive},
    utils::graph::{NodeId, Predecessors},
    Result,
};

/// Successors of a block ending in a `true`/`false` branch, true side first.
fn branch_targets(cfg: &Cfg, node: NodeId) -> Option<(NodeId, NodeId)> {
    let mut edges = cfg.out_edges(node);
    let (Some(first), Some(second), None) = (edges.next(), edges.next(), edges.next()) else {
        return None;
    };
    (first.kind() == BranchKind::True && second.kind() == BranchKind::False)
        .then(|| (first.to(), second.to()))
}

/// A block that can be folded into its only predecessor `outer`.
fn is_candidate(cfg: &Cfg, outer: NodeId, node: NodeId) -> bool {
    node != outer
        && cfg.entry() != Some(node)
        && cfg.in_degree(node) == 1
        && cfg.info(node).is_some_and(|info| info.is_cond_node)
        && branch_targets(cfg, node).is_some()
}

/// One planned contraction of `inner` into `outer`.
struct Contraction {
    op: CompCondOp,
    outer: NodeId,
    inner: NodeId,
    /// Successor of `inner` that `outer` branches to afterwards
    target: NodeId,
    body_true: NodeId,
    body_false: NodeId,
}

fn find_contraction(cfg: &Cfg, outer: NodeId) -> Option<Contraction> {
    let (then, other) = branch_targets(cfg, outer)?;

    if is_candidate(cfg, outer, then) {
        if let Some((t0, t1)) = branch_targets(cfg, then) {
            if t0 == other {
                return Some(Contraction {
                    op: CompCondOp::AndNot,
                    outer,
                    inner: then,
                    target: t1,
                    body_true: t1,
                    body_false: other,
                });
            }
            if t1 == other {
                return Some(Contraction {
                    op: CompCondOp::And,
                    outer,
                    inner: then,
                    target: t0,
                    body_true: t0,
                    body_false: other,
                });
            }
        }
    }

    if is_candidate(cfg, outer, other) {
        if let Some((e0, e1)) = branch_targets(cfg, other) {
            if e0 == then {
                return Some(Contraction {
                    op: CompCondOp::Or,
                    outer,
                    inner: other,
                    target: e1,
                    body_true: then,
                    body_false: e1,
                });
            }
            if e1 == then {
                return Some(Contraction {
                    op: CompCondOp::OrNot,
                    outer,
                    inner: other,
                    target: e0,
                    body_true: then,
                    body_false: e0,
                });
            }
        }
    }

    None
}

fn condition(cfg: &Cfg, node: NodeId) -> CondExpr {
    cfg.info(node)
        .and_then(|info| info.comp_cond.clone())
        .unwrap_or_else(|| CondExpr::leaf(cfg.label(node)))
}

fn contract(cfg: &mut Cfg, plan: &Contraction) -> Result<Primitive> {
    let primitive = Primitive::CompCond {
        op: plan.op,
        cond_a: cfg.label(plan.outer).to_string(),
        cond_b: cfg.label(plan.inner).to_string(),
        body_true: cfg.label(plan.body_true).to_string(),
        body_false: cfg.label(plan.body_false).to_string(),
    };

    let a = condition(cfg, plan.outer);
    let b = condition(cfg, plan.inner);
    let expr = match plan.op {
        CompCondOp::And => CondExpr::and(a, b),
        CompCondOp::AndNot => CondExpr::and(a, CondExpr::not(b)),
        CompCondOp::Or => CondExpr::or(a, b),
        CompCondOp::OrNot => CondExpr::or(a, CondExpr::not(b)),
    };

    // The replacement edge takes over the polarity of the edge it replaces
    let attrs = cfg
        .edge(plan.outer, plan.inner)
        .map(|edge| edge.attrs().clone())
        .unwrap_or_default();
    cfg.remove_node(plan.inner);
    cfg.add_edge(plan.outer, plan.target, attrs)?;
    if let Some(info) = cfg.info_mut(plan.outer) {
        info.comp_cond = Some(expr);
    }

    Ok(primitive)
}

/// Contracts short-circuit pairs until none is left.
///
/// Blocks are visited in ascending reverse post-order; after every
/// contraction the numbering is recomputed and the scan starts over.
///
/// # Errors
///
/// Returns [`Error::InvalidCfg`](crate::Error::InvalidCfg) if the graph has no entry.
pub(crate) fn struct_comp_cond(cfg: &mut Cfg) -> Result<Vec<Primitive>> {
    let mut primitives = Vec::new();

    loop {
        let numbering = cfg.init_dfs_numbers()?;
        let plan = numbering
            .reverse_postorder()
            .iter()
            .find_map(|&node| find_contraction(cfg, node));
        let Some(plan) = plan else {
            break;
        };
        primitives.push(contract(cfg, &plan)?);
    }

    cfg.init_dfs_numbers()?;
    Ok(primitives)
}
