//! Loop structuring over the derived sequence.
//!
//! Every interval whose header has a predecessor inside the interval closes a
//! loop. The back-edge found at level `i` of the derived sequence is mapped
//! down to the input graph, where the loop's members, kind and follow are
//! determined and written into the node annotations.

use crate::{
    analysis::{
        cfg::{Cfg, LoopType},
        interval::decompose::{derived_sequence, DerivedSequence},
    },
    primitive::{LoopKind, Primitive},
    utils::graph::{
        algorithms::{DfsNumbering, DominatorTree},
        GraphBase, NodeId, Predecessors, Successors,
    },
    Result,
};

/// The predecessor of `head` inside the interval with the latest block.
fn latest_pred(
    graph: &Cfg,
    numbering: &DfsNumbering,
    head: NodeId,
    inside: impl Fn(NodeId) -> bool,
) -> Option<NodeId> {
    graph
        .predecessors(head)
        .filter(|p| inside(*p))
        .max_by_key(|p| numbering.rev_post_num(*p))
}

/// Maps the latch found at `level` down to the input graph.
///
/// At each lower level the loop header keeps its label, and the latch of the
/// level above is the header of an interval; the new latch is the header's
/// latest predecessor inside that interval.
fn translate_latch(
    seq: &DerivedSequence,
    numberings: &[DfsNumbering],
    level: usize,
    head: &str,
    latch: &str,
) -> Option<String> {
    let mut latch = latch.to_string();
    for j in (0..level).rev() {
        let graph = &seq.graphs()[j];
        let head_id = graph.node_with_label(head)?;
        let interval = seq.intervals()[j]
            .iter()
            .find(|i| graph.label(i.header()) == latch)?;
        let found = latest_pred(graph, &numberings[j], head_id, |p| interval.contains(p))?;
        latch = graph.label(found).to_string();
    }
    Some(latch)
}

/// The members of the loop closed by `latch -> head`.
///
/// A member lies between header and latch in reverse post-order, is dominated
/// by the header, and reaches the latch without passing through the header.
fn loop_members(
    cfg: &Cfg,
    dom: &DominatorTree,
    numbering: &DfsNumbering,
    head: NodeId,
    latch: NodeId,
) -> Vec<bool> {
    let mut natural = vec![false; cfg.node_bound()];
    natural[head.index()] = true;
    let mut stack = vec![latch];
    while let Some(node) = stack.pop() {
        if natural[node.index()] {
            continue;
        }
        natural[node.index()] = true;
        stack.extend(cfg.predecessors(node));
    }

    let (Some(lo), Some(hi)) = (numbering.rev_post_num(head), numbering.rev_post_num(latch)) else {
        return vec![false; cfg.node_bound()];
    };
    let mut members = vec![false; cfg.node_bound()];
    for node in cfg.node_ids() {
        let in_range = numbering
            .rev_post_num(node)
            .is_some_and(|rpn| lo <= rpn && rpn <= hi);
        if natural[node.index()] && in_range && dom.dominates(head, node) {
            members[node.index()] = true;
        }
    }
    members
}

fn loop_kind(cfg: &Cfg, head: NodeId, latch: NodeId, members: &[bool]) -> LoopKind {
    let head_out = cfg.out_degree(head);
    let latch_out = cfg.out_degree(latch);

    if head == latch {
        LoopKind::Post
    } else if latch_out == 2 && head_out == 2 {
        if cfg.successors(head).all(|s| members[s.index()]) {
            LoopKind::Post
        } else {
            LoopKind::Pre
        }
    } else if latch_out == 2 {
        LoopKind::Post
    } else if head_out == 2 {
        LoopKind::Pre
    } else {
        LoopKind::Endless
    }
}

fn loop_follow(
    cfg: &Cfg,
    numbering: &DfsNumbering,
    kind: LoopKind,
    head: NodeId,
    latch: NodeId,
    members: &[bool],
) -> Option<NodeId> {
    let outside = |n: &NodeId| !members[n.index()];
    match kind {
        LoopKind::Pre => cfg.successors(head).find(outside),
        LoopKind::Post => cfg.successors(latch).find(outside),
        LoopKind::Endless => cfg
            .node_ids()
            .filter(|n| members[n.index()] && cfg.out_degree(*n) == 2)
            .filter_map(|n| {
                let exit = cfg.successors(n).find(outside)?;
                Some((numbering.rev_post_num(n), exit))
            })
            .min_by_key(|(rpn, _)| *rpn)
            .map(|(_, exit)| exit),
    }
}

/// Finds every loop, innermost levels of the derived sequence first.
///
/// Annotates headers with `loop_type` and `loop_follow`, latches with
/// `is_loop_latch`, and every member with `loop_head` unless an inner loop set
/// it already. A back-edge whose latch already belongs to a loop is skipped.
pub(crate) fn loop_struct(cfg: &mut Cfg) -> Result<Vec<Primitive>> {
    let numbering = cfg.init_dfs_numbers()?;
    let dom = cfg.dominators()?;
    let seq = derived_sequence(cfg)?;

    let mut numberings = Vec::with_capacity(seq.len());
    for graph in seq.graphs() {
        let Some(entry) = graph.entry() else {
            return Err(invalid_cfg!("derived graph of '{}' has no entry", cfg.name()));
        };
        numberings.push(DfsNumbering::compute(graph, entry));
    }

    let mut primitives = Vec::new();
    for (level, (graph, intervals)) in seq.graphs().iter().zip(seq.intervals()).enumerate() {
        for interval in intervals {
            let header = interval.header();
            let Some(latch) =
                latest_pred(graph, &numberings[level], header, |p| interval.contains(p))
            else {
                continue;
            };

            let head_label = graph.label(header);
            let Some(latch_label) =
                translate_latch(&seq, &numberings, level, head_label, graph.label(latch))
            else {
                continue;
            };
            let (Some(head), Some(latch)) = (
                cfg.node_with_label(head_label),
                cfg.node_with_label(&latch_label),
            ) else {
                continue;
            };
            if cfg.info(latch).is_some_and(|info| info.loop_head.is_some()) {
                continue;
            }

            let members = loop_members(cfg, &dom, &numbering, head, latch);
            for node in cfg.node_ids().filter(|n| members[n.index()]).collect::<Vec<_>>() {
                if let Some(info) = cfg.info_mut(node) {
                    if info.loop_head.is_none() {
                        info.loop_head = Some(head);
                    }
                }
            }

            let kind = loop_kind(cfg, head, latch, &members);
            let follow = loop_follow(cfg, &numbering, kind, head, latch, &members);
            if let Some(info) = cfg.info_mut(head) {
                info.loop_type = LoopType::from(kind);
                info.loop_follow = follow;
            }
            if let Some(info) = cfg.info_mut(latch) {
                info.is_loop_latch = true;
            }

            primitives.push(Primitive::Loop {
                kind,
                head: cfg.label(head).to_string(),
                latch: cfg.label(latch).to_string(),
                follow: follow.map(|f| cfg.label(f).to_string()),
            });
        }
    }

    Ok(primitives)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure(dot: &str) -> (Cfg, Vec<Primitive>) {
        let mut cfg = Cfg::from_dot(dot).unwrap();
        let primitives = loop_struct(&mut cfg).unwrap();
        (cfg, primitives)
    }

    fn info_of<'a>(cfg: &'a Cfg, label: &str) -> &'a crate::analysis::cfg::StructInfo {
        cfg.info(cfg.node_with_label(label).unwrap()).unwrap()
    }

    fn label_of(cfg: &Cfg, node: Option<NodeId>) -> Option<&str> {
        node.map(|n| cfg.label(n))
    }

    #[test]
    fn test_pre_tested_loop() {
        let (cfg, primitives) = structure(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> A }",
        );
        assert_eq!(
            primitives,
            vec![Primitive::Loop {
                kind: LoopKind::Pre,
                head: "A".into(),
                latch: "B".into(),
                follow: Some("C".into()),
            }]
        );
        assert_eq!(info_of(&cfg, "A").loop_type, LoopType::Pre);
        assert_eq!(label_of(&cfg, info_of(&cfg, "A").loop_follow), Some("C"));
        assert!(info_of(&cfg, "B").is_loop_latch);
        assert_eq!(label_of(&cfg, info_of(&cfg, "B").loop_head), Some("A"));
        // The exit is not part of the loop
        assert_eq!(info_of(&cfg, "C").loop_head, None);
    }

    #[test]
    fn test_post_tested_loop() {
        let (cfg, primitives) = structure(
            r#"digraph {
                E [entry=true]; E -> A;
                A -> B;
                B -> A [cond=true]; B -> C [cond=false];
            }"#,
        );
        assert_eq!(primitives.len(), 1);
        assert_eq!(info_of(&cfg, "A").loop_type, LoopType::Post);
        assert_eq!(label_of(&cfg, info_of(&cfg, "A").loop_follow), Some("C"));
    }

    #[test]
    fn test_self_loop() {
        let (cfg, primitives) = structure(
            "digraph { A [entry=true]; A -> B; B -> B [cond=true]; B -> C [cond=false] }",
        );
        assert_eq!(
            primitives,
            vec![Primitive::Loop {
                kind: LoopKind::Post,
                head: "B".into(),
                latch: "B".into(),
                follow: Some("C".into()),
            }]
        );
        assert!(info_of(&cfg, "B").is_loop_latch);
    }

    #[test]
    fn test_endless_loop() {
        let (cfg, primitives) = structure("digraph { A [entry=true]; A -> B; B -> A }");
        assert_eq!(
            primitives,
            vec![Primitive::Loop {
                kind: LoopKind::Endless,
                head: "A".into(),
                latch: "B".into(),
                follow: None,
            }]
        );
        assert_eq!(info_of(&cfg, "A").loop_type, LoopType::Endless);
        assert_eq!(info_of(&cfg, "A").loop_follow, None);
    }

    #[test]
    fn test_endless_loop_with_break() {
        let (cfg, _) = structure(
            r#"digraph {
                A [entry=true]; A -> B;
                B -> C;
                C -> D [cond=true]; C -> X [cond=false];
                D -> B;
            }"#,
        );
        assert_eq!(info_of(&cfg, "B").loop_type, LoopType::Endless);
        assert_eq!(label_of(&cfg, info_of(&cfg, "B").loop_follow), Some("X"));
    }

    #[test]
    fn test_nested_loops_found_through_derived_graphs() {
        let (cfg, primitives) = structure(
            r#"digraph {
                A [entry=true]; A -> B;
                B -> C;
                C -> C [cond=true]; C -> D [cond=false];
                D -> B [cond=true]; D -> E [cond=false];
            }"#,
        );
        let found: Vec<_> = primitives
            .iter()
            .map(|p| match p {
                Primitive::Loop { head, latch, .. } => (head.as_str(), latch.as_str()),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(found, vec![("C", "C"), ("B", "D")]);

        assert_eq!(label_of(&cfg, info_of(&cfg, "C").loop_head), Some("C"));
        assert_eq!(label_of(&cfg, info_of(&cfg, "D").loop_head), Some("B"));
        assert_eq!(info_of(&cfg, "B").loop_type, LoopType::Post);
        assert_eq!(label_of(&cfg, info_of(&cfg, "B").loop_follow), Some("E"));
        assert_eq!(info_of(&cfg, "E").loop_head, None);
    }
}
