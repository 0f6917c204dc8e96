//! Graphs shared by the integration tests.

#![allow(dead_code)]

use restructure::analysis::Cfg;

pub const PRE_LOOP: &str = "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> A }";

pub const IF_ELSE: &str =
    "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false]; B -> D; C -> D }";

pub const IF_RETURN: &str = "digraph { A [entry=true]; A -> B [cond=true]; A -> C [cond=false] }";

pub const SEQ_IF: &str = "digraph { E [entry=true]; E -> F; E -> H; F -> G; G -> H }";

pub const SHORT_CIRCUIT_AND: &str = r#"digraph {
    A [entry=true];
    A -> B [cond=true]; A -> E [cond=false];
    B -> C [cond=true]; B -> E [cond=false];
}"#;

pub const ENDLESS: &str = "digraph { A [entry=true]; A -> B; B -> A }";

pub const NESTED_LOOPS: &str = r#"digraph {
    A [entry=true]; A -> B;
    B -> C;
    C -> C [cond=true]; C -> D [cond=false];
    D -> B [cond=true]; D -> E [cond=false];
}"#;

pub const WHILE_WITH_IF: &str = r#"digraph {
    A [entry=true];
    A -> B [cond=true]; A -> F [cond=false];
    B -> C [cond=true]; B -> D [cond=false];
    C -> E; D -> E; E -> A;
}"#;

pub const DO_WHILE: &str = r#"digraph {
    A [entry=true]; A -> B; B -> C;
    C -> B [cond=true]; C -> D [cond=false];
}"#;

pub const LOOP_WITH_BREAK: &str = r#"digraph {
    A [entry=true]; A -> B;
    B -> C [cond=true]; B -> X [cond=false];
    C -> D [cond=true]; C -> X [cond=false];
    D -> B;
}"#;

pub const SWITCH: &str = r#"digraph {
    S [entry=true];
    S -> C1 [cond="1"]; S -> C2 [cond="2, 3"]; S -> D [cond=default];
    C1 -> J; C2 -> J; D -> J;
    J -> R [cond=true]; J -> K [cond=false];
    K -> R;
}"#;

pub const IRREDUCIBLE: &str = r#"digraph {
    A [entry=true];
    A -> B [cond=true]; A -> C [cond=false];
    B -> C; C -> B;
}"#;

/// Every shared graph with its name.
pub const CORPUS: &[(&str, &str)] = &[
    ("pre_loop", PRE_LOOP),
    ("if_else", IF_ELSE),
    ("if_return", IF_RETURN),
    ("seq_if", SEQ_IF),
    ("short_circuit_and", SHORT_CIRCUIT_AND),
    ("endless", ENDLESS),
    ("nested_loops", NESTED_LOOPS),
    ("while_with_if", WHILE_WITH_IF),
    ("do_while", DO_WHILE),
    ("loop_with_break", LOOP_WITH_BREAK),
    ("switch", SWITCH),
    ("irreducible", IRREDUCIBLE),
];

pub fn parse(dot: &str) -> Cfg {
    Cfg::from_dot(dot).unwrap()
}

pub fn corpus() -> impl Iterator<Item = (&'static str, Cfg)> {
    CORPUS.iter().map(|(name, dot)| (*name, parse(dot)))
}
