//! Hammock predicates.
//!
//! Each predicate looks at one candidate header and either returns the
//! primitive rooted there or `None`. Predicates are pure: they read the graph
//! and its dominator tree and never fail.
//!
//! Role nodes of a match are always pairwise distinct, and every 2-successor
//! predicate tries the canonical assignment of the successors first and the
//! swapped one second.

use crate::{
    analysis::cfg::Cfg,
    primitive::{Primitive, PrimitiveKind},
    utils::graph::{algorithms::DominatorTree, GraphBase, NodeId, Predecessors, Successors},
};

/// Signature shared by all predicates.
pub type Predicate = fn(&Cfg, &DominatorTree, NodeId) -> Option<Primitive>;

/// The predicates in matching order. The order decides which shape is found
/// when several apply to the same region.
pub const PREDICATES: [(PrimitiveKind, Predicate); 6] = [
    (PrimitiveKind::Seq, seq),
    (PrimitiveKind::PreLoop, pre_loop),
    (PrimitiveKind::PostLoop, post_loop),
    (PrimitiveKind::If, if_then),
    (PrimitiveKind::IfReturn, if_return),
    (PrimitiveKind::IfElse, if_else),
];

fn succs(cfg: &Cfg, node: NodeId) -> Vec<NodeId> {
    cfg.successors(node).collect()
}

fn preds(cfg: &Cfg, node: NodeId) -> Vec<NodeId> {
    cfg.predecessors(node).collect()
}

/// `node`'s only predecessor is `pred`.
fn only_pred(cfg: &Cfg, node: NodeId, pred: NodeId) -> bool {
    preds(cfg, node) == [pred]
}

/// `node`'s only successor is `succ`.
fn only_succ(cfg: &Cfg, node: NodeId, succ: NodeId) -> bool {
    succs(cfg, node) == [succ]
}

/// Both orders of a 2-way node's successors, canonical first.
fn two_way(cfg: &Cfg, node: NodeId) -> Option<[(NodeId, NodeId); 2]> {
    match succs(cfg, node).as_slice() {
        &[a, b] => Some([(a, b), (b, a)]),
        _ => None,
    }
}

fn distinct(nodes: &[NodeId]) -> bool {
    nodes
        .iter()
        .enumerate()
        .all(|(i, a)| nodes[i + 1..].iter().all(|b| a != b))
}

fn label(cfg: &Cfg, node: NodeId) -> String {
    cfg.label(node).to_string()
}

/// `entry` falls through to `exit`, its only successor, and is the only way
/// into `exit`.
pub fn seq(cfg: &Cfg, dom: &DominatorTree, entry: NodeId) -> Option<Primitive> {
    let &[exit] = succs(cfg, entry).as_slice() else {
        return None;
    };
    if exit == entry || !only_pred(cfg, exit, entry) || !dom.dominates(entry, exit) {
        return None;
    }
    Some(Primitive::Seq {
        entry: label(cfg, entry),
        exit: label(cfg, exit),
    })
}

/// `cond` branches to `body`, which jumps straight back, or leaves to `exit`.
pub fn pre_loop(cfg: &Cfg, dom: &DominatorTree, cond: NodeId) -> Option<Primitive> {
    two_way(cfg, cond)?.into_iter().find_map(|(body, exit)| {
        let matches = distinct(&[cond, body, exit])
            && only_pred(cfg, body, cond)
            && only_succ(cfg, body, cond)
            && only_pred(cfg, exit, cond)
            && dom.dominates(cond, body)
            && dom.dominates(cond, exit);
        matches.then(|| Primitive::PreLoop {
            cond: label(cfg, cond),
            body: label(cfg, body),
            exit: label(cfg, exit),
        })
    })
}

/// `cond` loops back to itself on one branch and leaves to `exit` on the other.
pub fn post_loop(cfg: &Cfg, dom: &DominatorTree, cond: NodeId) -> Option<Primitive> {
    two_way(cfg, cond)?.into_iter().find_map(|(back, exit)| {
        let matches = back == cond
            && exit != cond
            && only_pred(cfg, exit, cond)
            && dom.dominates(cond, exit);
        matches.then(|| Primitive::PostLoop {
            cond: label(cfg, cond),
            exit: label(cfg, exit),
        })
    })
}

/// `cond` either runs `body` and falls into `exit`, or skips to `exit`.
pub fn if_then(cfg: &Cfg, dom: &DominatorTree, cond: NodeId) -> Option<Primitive> {
    two_way(cfg, cond)?.into_iter().find_map(|(body, exit)| {
        let mut exit_preds = preds(cfg, exit);
        exit_preds.sort();
        let mut expected = vec![cond, body];
        expected.sort();

        let matches = distinct(&[cond, body, exit])
            && only_pred(cfg, body, cond)
            && only_succ(cfg, body, exit)
            && exit_preds == expected
            && dom.dominates(cond, body)
            && dom.dominates(cond, exit);
        matches.then(|| Primitive::If {
            cond: label(cfg, cond),
            body: label(cfg, body),
            exit: label(cfg, exit),
        })
    })
}

/// `cond` either runs `body`, which returns, or continues with `exit`.
///
/// `cond` must not sit on a cycle through a node it dominates, as a loop
/// re-entering `cond` would be swallowed by the merge.
pub fn if_return(cfg: &Cfg, dom: &DominatorTree, cond: NodeId) -> Option<Primitive> {
    if cfg.predecessors(cond).any(|p| dom.dominates(cond, p)) {
        return None;
    }
    two_way(cfg, cond)?.into_iter().find_map(|(body, exit)| {
        let matches = distinct(&[cond, body, exit])
            && only_pred(cfg, body, cond)
            && cfg.out_degree(body) == 0
            && only_pred(cfg, exit, cond)
            && dom.dominates(cond, body)
            && dom.dominates(cond, exit);
        matches.then(|| Primitive::IfReturn {
            cond: label(cfg, cond),
            body: label(cfg, body),
            exit: label(cfg, exit),
        })
    })
}

/// `cond` runs one of two bodies, both of which fall into `exit`.
pub fn if_else(cfg: &Cfg, dom: &DominatorTree, cond: NodeId) -> Option<Primitive> {
    two_way(cfg, cond)?
        .into_iter()
        .find_map(|(body_true, body_false)| {
            let &[exit] = succs(cfg, body_true).as_slice() else {
                return None;
            };
            let mut exit_preds = preds(cfg, exit);
            exit_preds.sort();
            let mut expected = vec![body_true, body_false];
            expected.sort();

            let matches = distinct(&[cond, body_true, body_false, exit])
                && only_pred(cfg, body_true, cond)
                && only_pred(cfg, body_false, cond)
                && only_succ(cfg, body_false, exit)
                && exit_preds == expected
                && dom.dominates(cond, body_true)
                && dom.dominates(cond, body_false)
                && dom.dominates(cond, exit);
            matches.then(|| Primitive::IfElse {
                cond: label(cfg, cond),
                body_true: label(cfg, body_true),
                body_false: label(cfg, body_false),
                exit: label(cfg, exit),
            })
        })
}

/// Returns the first match in predicate order, then candidate order.
pub fn find_primitive(cfg: &Cfg, dom: &DominatorTree) -> Option<Primitive> {
    PREDICATES.iter().find_map(|(_, predicate)| {
        cfg.node_ids()
            .find_map(|node| predicate(cfg, dom, node))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(dot: &str) -> (Cfg, DominatorTree) {
        let cfg = Cfg::from_dot(dot).unwrap();
        let dom = cfg.dominators().unwrap();
        (cfg, dom)
    }

    fn at(cfg: &Cfg, label: &str) -> NodeId {
        cfg.node_with_label(label).unwrap()
    }

    #[test]
    fn test_seq() {
        let (cfg, dom) = setup("digraph { A [entry=true]; A -> B; B -> C; D -> C; A -> D [cond=x] }");
        assert_eq!(seq(&cfg, &dom, at(&cfg, "A")), None);
        // C has two predecessors
        assert_eq!(seq(&cfg, &dom, at(&cfg, "B")), None);

        let (cfg, dom) = setup("digraph { A [entry=true]; A -> B; B -> C }");
        assert_eq!(
            seq(&cfg, &dom, at(&cfg, "A")),
            Some(Primitive::Seq {
                entry: "A".into(),
                exit: "B".into()
            })
        );
    }

    #[test]
    fn test_seq_rejects_self_loop_and_undominated_exit() {
        let (cfg, dom) = setup("digraph { A [entry=true]; A -> A }");
        assert_eq!(seq(&cfg, &dom, at(&cfg, "A")), None);

        // B -> A where A is the entry: B does not dominate A
        let (cfg, dom) = setup("digraph { A [entry=true]; A -> B; B -> A }");
        assert_eq!(seq(&cfg, &dom, at(&cfg, "B")), None);
        assert!(seq(&cfg, &dom, at(&cfg, "A")).is_some());
    }

    #[test]
    fn test_pre_loop_either_branch() {
        let (cfg, dom) = setup(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> A }",
        );
        assert_eq!(
            pre_loop(&cfg, &dom, at(&cfg, "A")),
            Some(Primitive::PreLoop {
                cond: "A".into(),
                body: "B".into(),
                exit: "C".into()
            })
        );

        // Body on the false branch
        let (cfg, dom) = setup(
            "digraph { A [entry=true]; A -> C [cond=true]; A -> B [cond=false]; B -> A }",
        );
        assert_eq!(
            pre_loop(&cfg, &dom, at(&cfg, "A")),
            Some(Primitive::PreLoop {
                cond: "A".into(),
                body: "B".into(),
                exit: "C".into()
            })
        );
    }

    #[test]
    fn test_pre_loop_rejects_shared_exit() {
        let (cfg, dom) = setup(
            "digraph { P [entry=true]; P -> A [cond=true]; P -> C [cond=false]; A -> B [cond=true]; A -> C [cond=false]; B -> A }",
        );
        assert_eq!(pre_loop(&cfg, &dom, at(&cfg, "A")), None);
    }

    #[test]
    fn test_post_loop() {
        let (cfg, dom) =
            setup("digraph { A [entry=true]; A -> A [cond=false]; A -> B [cond=true] }");
        assert_eq!(
            post_loop(&cfg, &dom, at(&cfg, "A")),
            Some(Primitive::PostLoop {
                cond: "A".into(),
                exit: "B".into()
            })
        );

        let (cfg, dom) =
            setup("digraph { A [entry=true]; A -> B [cond=false]; A -> C [cond=true] }");
        assert_eq!(post_loop(&cfg, &dom, at(&cfg, "A")), None);
    }

    #[test]
    fn test_if_then() {
        let (cfg, dom) = setup(
            "digraph { A [entry=true]; A -> C [cond=true]; A -> B [cond=false]; B -> C }",
        );
        assert_eq!(
            if_then(&cfg, &dom, at(&cfg, "A")),
            Some(Primitive::If {
                cond: "A".into(),
                body: "B".into(),
                exit: "C".into()
            })
        );

        // The exit is also reached from elsewhere
        let (cfg, dom) = setup(
            "digraph { P [entry=true]; P -> A [cond=true]; P -> C [cond=false]; A -> B [cond=true]; A -> C [cond=false]; B -> C }",
        );
        assert_eq!(if_then(&cfg, &dom, at(&cfg, "A")), None);
    }

    #[test]
    fn test_if_return() {
        let (cfg, dom) =
            setup("digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false] }");
        assert_eq!(
            if_return(&cfg, &dom, at(&cfg, "A")),
            Some(Primitive::IfReturn {
                cond: "A".into(),
                body: "B".into(),
                exit: "C".into()
            })
        );

        // A loop re-enters cond through C
        let (cfg, dom) = setup(
            "digraph { P [entry=true]; P -> A; A -> B [cond=true]; A -> C [cond=false]; C -> A }",
        );
        assert_eq!(if_return(&cfg, &dom, at(&cfg, "A")), None);
    }

    #[test]
    fn test_if_else() {
        let (cfg, dom) = setup(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> D; C -> D }",
        );
        assert_eq!(
            if_else(&cfg, &dom, at(&cfg, "A")),
            Some(Primitive::IfElse {
                cond: "A".into(),
                body_true: "B".into(),
                body_false: "C".into(),
                exit: "D".into()
            })
        );

        // Bodies leading to different blocks
        let (cfg, dom) = setup(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> D; C -> E }",
        );
        assert_eq!(if_else(&cfg, &dom, at(&cfg, "A")), None);
    }

    #[test]
    fn test_find_primitive_order() {
        // seq is tried before if
        let (cfg, dom) = setup("digraph { E [entry=true]; E -> F; E -> H; F -> G; G -> H }");
        assert_eq!(
            find_primitive(&cfg, &dom),
            Some(Primitive::Seq {
                entry: "F".into(),
                exit: "G".into()
            })
        );

        // Irreducible: two entries into the B/C cycle
        let (cfg, dom) = setup(
            "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> C; C -> B }",
        );
        assert_eq!(find_primitive(&cfg, &dom), None);
    }
}
