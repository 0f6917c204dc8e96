//! 2-way conditional structuring.

use crate::{
    analysis::{
        cfg::{Cfg, LoopType},
        interval::Unresolved,
    },
    primitive::Primitive,
    utils::graph::{NodeId, Predecessors, Successors},
    Result,
};

/// `node` heads a loop, or its branch is the exit test of a `post` loop.
fn is_loop_test(cfg: &Cfg, node: NodeId) -> bool {
    let Some(info) = cfg.info(node) else {
        return false;
    };
    if info.loop_type != LoopType::None {
        return true;
    }
    info.is_loop_latch
        && info
            .loop_head
            .and_then(|head| cfg.info(head))
            .is_some_and(|head| head.loop_type == LoopType::Post)
}

fn conditional(cfg: &Cfg, header: NodeId, follow: NodeId) -> Option<Primitive> {
    let succs: Vec<NodeId> = cfg.successors(header).collect();
    let &[first, second] = succs.as_slice() else {
        return None;
    };
    let label = |n: NodeId| cfg.label(n).to_string();

    let primitive = if first == follow || second == follow {
        let body = if first == follow { second } else { first };
        Primitive::If {
            cond: label(header),
            body: label(body),
            exit: label(follow),
        }
    } else {
        Primitive::IfElse {
            cond: label(header),
            body_true: label(first),
            body_false: label(second),
            exit: label(follow),
        }
    };
    Some(primitive)
}

/// Finds the follow of every 2-way block that is neither a loop header nor
/// the latch of a `post` loop.
///
/// The follow of `m` is the latest block immediately dominated by `m` with at
/// least two predecessors. Blocks without one wait on the unresolved stack,
/// as in [`struct_nway`](super::nway::struct_nway).
pub(crate) fn struct_2way(cfg: &mut Cfg) -> Result<Vec<Primitive>> {
    let numbering = cfg.init_dfs_numbers()?;
    let dom = cfg.dominators()?;

    let mut unresolved = Unresolved::default();
    let mut primitives = Vec::new();
    for &m in numbering.reverse_postorder().iter().rev() {
        if cfg.out_degree(m) != 2 || is_loop_test(cfg, m) {
            continue;
        }

        let follow = dom
            .children(m)
            .iter()
            .copied()
            .filter(|n| cfg.in_degree(*n) >= 2)
            .max_by_key(|n| numbering.rev_post_num(*n));

        match follow {
            Some(follow) => {
                for header in unresolved.resolve(cfg, m, follow) {
                    primitives.extend(conditional(cfg, header, follow));
                }
            }
            None => unresolved.push(m),
        }
    }

    Ok(primitives)
}
