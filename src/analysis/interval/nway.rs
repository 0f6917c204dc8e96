//! N-way conditional structuring.

use crate::{
    analysis::{cfg::Cfg, interval::Unresolved},
    primitive::Primitive,
    utils::graph::{
        algorithms::{DfsNumbering, DominatorTree},
        NodeId, Predecessors, Successors,
    },
    Result,
};

/// The reconvergence node of a switch headed by `m`.
///
/// When every case target is immediately dominated by `m` the follow is looked
/// for below `m`, otherwise below the common dominator of the targets. The
/// candidate with most incoming edges wins, ties going to the later block.
fn switch_follow(
    cfg: &Cfg,
    dom: &DominatorTree,
    numbering: &DfsNumbering,
    m: NodeId,
    targets: &[NodeId],
) -> Option<NodeId> {
    let root = if targets
        .iter()
        .all(|t| dom.immediate_dominator(*t) == Some(m))
    {
        m
    } else {
        dom.common_dominator(targets)?
    };

    dom.children(root)
        .iter()
        .copied()
        .filter(|n| cfg.in_degree(*n) >= 2)
        .max_by_key(|n| (cfg.in_degree(*n), numbering.rev_post_num(*n)))
}

fn switch_primitive(cfg: &Cfg, header: NodeId, follow: NodeId) -> Primitive {
    Primitive::Switch {
        cond: cfg.label(header).to_string(),
        follow: cfg.label(follow).to_string(),
        bodies: cfg
            .successors(header)
            .map(|s| cfg.label(s).to_string())
            .collect(),
    }
}

/// Finds the follow of every block with more than two successors.
///
/// Blocks are visited in descending reverse post-order, so inner switches come
/// first. A switch without a follow of its own waits on the unresolved stack
/// and takes the follow of the next enclosing switch that has one.
pub(crate) fn struct_nway(cfg: &mut Cfg) -> Result<Vec<Primitive>> {
    let numbering = cfg.init_dfs_numbers()?;
    let dom = cfg.dominators()?;

    let mut unresolved = Unresolved::default();
    let mut primitives = Vec::new();
    for &m in numbering.reverse_postorder().iter().rev() {
        let targets: Vec<NodeId> = cfg.successors(m).collect();
        if targets.len() <= 2 {
            continue;
        }

        match switch_follow(cfg, &dom, &numbering, m, &targets) {
            Some(follow) => {
                for header in unresolved.resolve(cfg, m, follow) {
                    primitives.push(switch_primitive(cfg, header, follow));
                }
            }
            None => unresolved.push(m),
        }
    }

    Ok(primitives)
}
