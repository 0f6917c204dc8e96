//! Graphviz DOT reader and writer for control flow graphs.
//!
//! The supported subset is what CFG dumps use:
//!
//! - `strict`, `digraph` and an optional graph id
//! - node statements, edge chains (`A -> B -> C`) and attribute lists
//! - `graph`, `node` and `edge` default statements and `id = id` graph attributes
//! - `;` and `,` separators, `//`, `/* */` and `#` comments
//! - bare ids, numerals and quoted strings (with `\"` escapes, line
//!   continuations and `+` concatenation)
//!
//! Subgraphs, ports, undirected graphs and HTML strings are rejected.
//!
//! Node and edge defaults are folded into the attributes of the nodes and
//! edges that follow them, so a parsed graph carries explicit attributes only.
//! The writer emits no defaults, and `Cfg::from_dot(&cfg.to_dot())` is equal to
//! `cfg`.

use std::{collections::HashMap, fmt::Write, iter::Peekable, str::Chars};

use crate::{
    analysis::cfg::{
        graph::Cfg,
        node::{Attrs, Node},
    },
    utils::{is_keyword, quote_id, unescape_dot},
    Error, Result,
};

fn syntax(line: usize, message: impl Into<String>) -> Error {
    Error::DotSyntax {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Id { text: String, quoted: bool },
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    Semicolon,
    Comma,
    Colon,
    Plus,
    Arrow,
    UndirectedEdge,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Id { text, .. } => format!("'{text}'"),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Arrow => "'->'".to_string(),
            Token::UndirectedEdge => "'--'".to_string(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Id { text, quoted: false } if text.eq_ignore_ascii_case(keyword))
    }
}

struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.input.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        while let Some(&c) = self.input.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '#' => self.skip_line(),
                '/' => {
                    let start = self.line;
                    self.bump();
                    match self.bump() {
                        Some('/') => self.skip_line(),
                        Some('*') => self.skip_block_comment(start)?,
                        _ => return Err(syntax(start, "stray '/'")),
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, start: usize) -> Result<()> {
        let mut star = false;
        while let Some(c) = self.bump() {
            if star && c == '/' {
                return Ok(());
            }
            star = c == '*';
        }
        Err(syntax(start, "unterminated comment"))
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>> {
        self.skip_trivia()?;
        let line = self.line;
        let Some(&c) = self.input.peek() else {
            return Ok(None);
        };

        let token = match c {
            '{' | '}' | '[' | ']' | '=' | ';' | ',' | ':' | '+' => {
                self.bump();
                match c {
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '=' => Token::Equals,
                    ';' => Token::Semicolon,
                    ',' => Token::Comma,
                    ':' => Token::Colon,
                    _ => Token::Plus,
                }
            }
            '"' => self.quoted(line)?,
            '<' => return Err(Error::NotImplemented("DOT HTML strings".to_string())),
            '-' => {
                self.bump();
                match self.input.peek() {
                    Some('>') => {
                        self.bump();
                        Token::Arrow
                    }
                    Some('-') => {
                        self.bump();
                        Token::UndirectedEdge
                    }
                    Some(d) if d.is_ascii_digit() || *d == '.' => self.numeral("-", line)?,
                    _ => return Err(syntax(line, "stray '-'")),
                }
            }
            c if c.is_ascii_digit() || c == '.' => self.numeral("", line)?,
            c if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() => {
                let mut text = String::new();
                while let Some(&c) = self.input.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Token::Id {
                    text,
                    quoted: false,
                }
            }
            other => return Err(syntax(line, format!("unexpected character '{other}'"))),
        };
        Ok(Some((token, line)))
    }

    fn numeral(&mut self, prefix: &str, line: usize) -> Result<Token> {
        let mut text = prefix.to_string();
        let mut seen_dot = false;
        let mut digits = 0;
        while let Some(&c) = self.input.peek() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            text.push(c);
            self.bump();
        }
        if digits == 0 {
            return Err(syntax(line, format!("malformed numeral '{text}'")));
        }
        if let Some(&c) = self.input.peek() {
            if c.is_ascii_alphabetic() || c == '_' {
                return Err(syntax(line, format!("malformed numeral '{text}{c}'")));
            }
        }
        Ok(Token::Id {
            text,
            quoted: false,
        })
    }

    fn quoted(&mut self, line: usize) -> Result<Token> {
        self.bump();
        let mut raw = String::new();
        loop {
            match self.bump() {
                None => return Err(syntax(line, "unterminated string")),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    // Line continuation
                    Some('\n') => {}
                    Some(next) => {
                        raw.push('\\');
                        raw.push(next);
                    }
                    None => return Err(syntax(line, "unterminated string")),
                },
                Some(c) => raw.push(c),
            }
        }
        Ok(Token::Id {
            text: unescape_dot(&raw),
            quoted: true,
        })
    }
}

/// Statements collected before the graph is built. Node attributes can still
/// change after a node's first mention, and entry detection happens when a
/// node is added to the [`Cfg`].
#[derive(Default)]
struct Document {
    name: String,
    strict: bool,
    graph_attrs: Attrs,
    node_defaults: Attrs,
    edge_defaults: Attrs,
    nodes: Vec<(String, Attrs)>,
    node_index: HashMap<String, usize>,
    edges: Vec<(usize, usize, Attrs)>,
    edge_index: HashMap<(usize, usize), usize>,
}

impl Document {
    fn touch_node(&mut self, label: &str) -> usize {
        if let Some(&index) = self.node_index.get(label) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes
            .push((label.to_string(), self.node_defaults.clone()));
        self.node_index.insert(label.to_string(), index);
        index
    }

    fn add_edge(&mut self, from: usize, to: usize, attrs: Attrs, line: usize) -> Result<()> {
        if let Some(&existing) = self.edge_index.get(&(from, to)) {
            if !self.strict {
                let (from_label, to_label) = (&self.nodes[from].0, &self.nodes[to].0);
                return Err(syntax(
                    line,
                    format!("parallel edge '{from_label}' -> '{to_label}'"),
                ));
            }
            self.edges[existing].2.extend(attrs);
            return Ok(());
        }
        self.edge_index.insert((from, to), self.edges.len());
        self.edges.push((from, to, attrs));
        Ok(())
    }

    fn into_cfg(self) -> Result<Cfg> {
        let mut cfg = Cfg::new(self.name);
        *cfg.graph_attrs_mut() = self.graph_attrs;

        let mut ids = Vec::with_capacity(self.nodes.len());
        for (label, attrs) in self.nodes {
            ids.push(cfg.add_node(Node::with_attrs(label, attrs))?);
        }
        for (from, to, attrs) in self.edges {
            cfg.add_edge(ids[from], ids[to], attrs)?;
        }
        Ok(cfg)
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(Parser { tokens, pos: 0 })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        let line = self.line();
        match self.advance() {
            Some(found) if found == *token => Ok(()),
            Some(found) => Err(syntax(
                line,
                format!("expected {}, found {}", token.describe(), found.describe()),
            )),
            None => Err(syntax(
                line,
                format!("expected {}, found end of input", token.describe()),
            )),
        }
    }

    /// Reads an id; quoted ids joined by `+` are concatenated.
    fn id(&mut self) -> Result<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Id { text, quoted }) => {
                let mut text = text;
                if quoted {
                    while self.peek() == Some(&Token::Plus) {
                        self.pos += 1;
                        match self.advance() {
                            Some(Token::Id { text: more, quoted: true }) => text.push_str(&more),
                            _ => return Err(syntax(line, "'+' must join two quoted strings")),
                        }
                    }
                }
                Ok(text)
            }
            Some(found) => Err(syntax(line, format!("expected an id, found {}", found.describe()))),
            None => Err(syntax(line, "expected an id, found end of input")),
        }
    }

    fn parse(&mut self) -> Result<Document> {
        let mut doc = Document::default();

        if self.peek().is_some_and(|t| t.is_keyword("strict")) {
            self.pos += 1;
            doc.strict = true;
        }
        match self.peek() {
            Some(t) if t.is_keyword("digraph") => self.pos += 1,
            Some(t) if t.is_keyword("graph") => {
                return Err(Error::NotImplemented("undirected DOT graphs".to_string()))
            }
            _ => return Err(syntax(self.line(), "expected 'digraph'")),
        }
        if matches!(self.peek(), Some(Token::Id { .. })) {
            doc.name = self.id()?;
        }

        self.expect(&Token::LBrace)?;
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Semicolon) => self.pos += 1,
                Some(_) => self.statement(&mut doc)?,
                None => return Err(syntax(self.line(), "missing '}'")),
            }
        }
        if let Some(token) = self.peek() {
            return Err(syntax(
                self.line(),
                format!("unexpected {} after the graph", token.describe()),
            ));
        }
        Ok(doc)
    }

    fn statement(&mut self, doc: &mut Document) -> Result<()> {
        let line = self.line();
        let Some(token) = self.peek() else {
            return Err(syntax(line, "unexpected end of input"));
        };

        if *token == Token::LBrace || token.is_keyword("subgraph") {
            return Err(Error::NotImplemented("DOT subgraphs".to_string()));
        }
        for (keyword, target) in [("graph", 0), ("node", 1), ("edge", 2)] {
            if token.is_keyword(keyword) {
                self.pos += 1;
                if self.peek() != Some(&Token::LBracket) {
                    return Err(syntax(line, format!("expected '[' after '{keyword}'")));
                }
                let attrs = self.attr_lists()?;
                let defaults = match target {
                    0 => &mut doc.graph_attrs,
                    1 => &mut doc.node_defaults,
                    _ => &mut doc.edge_defaults,
                };
                defaults.extend(attrs);
                return Ok(());
            }
        }
        if let Token::Id { text, quoted: false } = token {
            if is_keyword(text) {
                return Err(syntax(line, format!("unexpected keyword '{text}'")));
            }
        }

        let first = self.id()?;
        match self.peek() {
            Some(Token::Equals) => {
                self.pos += 1;
                let value = self.id()?;
                doc.graph_attrs.insert(first, value);
            }
            Some(Token::Colon) => return Err(Error::NotImplemented("DOT ports".to_string())),
            Some(Token::UndirectedEdge) => {
                return Err(syntax(line, "undirected edge '--' in a digraph"))
            }
            Some(Token::Arrow) => {
                let mut chain = vec![doc.touch_node(&first)];
                while self.eat(&Token::Arrow) {
                    if matches!(self.peek(), Some(Token::LBrace))
                        || self.peek().is_some_and(|t| t.is_keyword("subgraph"))
                    {
                        return Err(Error::NotImplemented("DOT subgraphs".to_string()));
                    }
                    let label = self.id()?;
                    chain.push(doc.touch_node(&label));
                }
                if self.peek() == Some(&Token::Colon) {
                    return Err(Error::NotImplemented("DOT ports".to_string()));
                }
                let mut attrs = doc.edge_defaults.clone();
                attrs.extend(self.attr_lists()?);
                for pair in chain.windows(2) {
                    doc.add_edge(pair[0], pair[1], attrs.clone(), line)?;
                }
            }
            _ => {
                let index = doc.touch_node(&first);
                let attrs = self.attr_lists()?;
                doc.nodes[index].1.extend(attrs);
            }
        }
        Ok(())
    }

    fn attr_lists(&mut self) -> Result<Attrs> {
        let mut attrs = Attrs::new();
        while self.eat(&Token::LBracket) {
            loop {
                if self.eat(&Token::RBracket) {
                    break;
                }
                let key = self.id()?;
                if !self.eat(&Token::Equals) {
                    return Err(syntax(self.line(), format!("expected '=' after '{key}'")));
                }
                let value = self.id()?;
                attrs.insert(key, value);
                if !self.eat(&Token::Comma) {
                    self.eat(&Token::Semicolon);
                }
            }
        }
        Ok(attrs)
    }
}

fn write_attr_list(out: &mut String, attrs: &Attrs) {
    if attrs.is_empty() {
        return;
    }
    out.push_str(" [");
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}={}", quote_id(key), quote_id(value));
    }
    out.push(']');
}

impl Cfg {
    /// Parses a control flow graph from DOT.
    ///
    /// The entry is the node carrying `entry="true"`. A graph without such a node
    /// parses but does not [validate](Cfg::validate).
    ///
    /// # Errors
    ///
    /// - [`Error::DotSyntax`] for malformed input, with the offending line
    /// - [`Error::NotImplemented`] for subgraphs, ports, undirected graphs and HTML strings
    /// - [`Error::InvalidCfg`] if the graph breaks a CFG invariant (e.g. two entries)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use restructure::analysis::Cfg;
    ///
    /// let cfg = Cfg::from_dot(r#"
    ///     digraph f {
    ///         A [entry=true];
    ///         A -> B [cond=true];
    ///         A -> C [cond=false];
    ///         B -> A;
    ///     }
    /// "#).unwrap();
    /// assert_eq!(cfg.name(), "f");
    /// assert_eq!(cfg.edge_count(), 3);
    /// ```
    pub fn from_dot(input: &str) -> Result<Cfg> {
        Parser::new(input)?.parse()?.into_cfg()
    }

    /// Writes the graph as DOT.
    ///
    /// Nodes are written in node order, then edges grouped by source in successor
    /// order. Attributes are sorted by key and ids are quoted only when needed.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        if self.name().is_empty() {
            dot.push_str("digraph {\n");
        } else {
            let _ = writeln!(dot, "digraph {} {{", quote_id(self.name()));
        }

        for (key, value) in self.graph_attrs() {
            let _ = writeln!(dot, "    {}={};", quote_id(key), quote_id(value));
        }
        for node in self.nodes() {
            dot.push_str("    ");
            dot.push_str(&quote_id(node.label()));
            write_attr_list(&mut dot, node.attrs());
            dot.push_str(";\n");
        }
        for edge in self.edges() {
            let _ = write!(
                dot,
                "    {} -> {}",
                quote_id(self.label(edge.from())),
                quote_id(self.label(edge.to()))
            );
            write_attr_list(&mut dot, edge.attrs());
            dot.push_str(";\n");
        }

        dot.push_str("}\n");
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::graph::{GraphBase, Successors};

    fn labels_of(cfg: &Cfg, ids: impl Iterator<Item = crate::utils::graph::NodeId>) -> Vec<String> {
        ids.map(|n| cfg.label(n).to_string()).collect()
    }

    #[test]
    fn test_parse_basic_graph() {
        let cfg = Cfg::from_dot(
            r#"digraph main {
                A [entry=true]
                A -> B [cond=true]
                A -> C [cond=false]
                B -> A
            }"#,
        )
        .unwrap();
        let a = cfg.node_with_label("A").unwrap();
        assert_eq!(cfg.name(), "main");
        assert_eq!(cfg.entry(), Some(a));
        assert_eq!(cfg.node_count(), 3);
        assert_eq!(labels_of(&cfg, cfg.successors(a)), vec!["B", "C"]);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_parse_edge_chain_and_defaults() {
        let cfg = Cfg::from_dot(
            r#"strict digraph {
                node [shape=box]; edge [color=red];
                rankdir = LR;
                graph [label="f"];
                X -> Y -> Z [weight=2];
                W;
            }"#,
        )
        .unwrap();
        let x = cfg.node_with_label("X").unwrap();
        let y = cfg.node_with_label("Y").unwrap();
        let z = cfg.node_with_label("Z").unwrap();
        let w = cfg.node_with_label("W").unwrap();

        assert_eq!(cfg.graph_attrs().get("rankdir").map(String::as_str), Some("LR"));
        assert_eq!(cfg.graph_attrs().get("label").map(String::as_str), Some("f"));
        assert_eq!(cfg.node(w).unwrap().attrs().get("shape").map(String::as_str), Some("box"));
        let xy = cfg.edge(x, y).unwrap();
        assert_eq!(xy.attrs().get("color").map(String::as_str), Some("red"));
        assert_eq!(xy.attrs().get("weight").map(String::as_str), Some("2"));
        assert!(cfg.edge(y, z).is_some());
        assert_eq!(cfg.edge_count(), 2);
    }

    #[test]
    fn test_defaults_apply_to_later_statements_only() {
        let cfg = Cfg::from_dot("digraph { A; node [color=blue]; B }").unwrap();
        let a = cfg.node_with_label("A").unwrap();
        let b = cfg.node_with_label("B").unwrap();
        assert!(cfg.node(a).unwrap().attrs().is_empty());
        assert_eq!(cfg.node(b).unwrap().attrs().len(), 1);
    }

    #[test]
    fn test_repeated_node_statement_merges_attributes() {
        let cfg = Cfg::from_dot("digraph { A -> B; A [entry=true]; A [color=red, entry=true] }").unwrap();
        let a = cfg.node_with_label("A").unwrap();
        assert_eq!(cfg.entry(), Some(a));
        assert_eq!(cfg.node(a).unwrap().attrs().len(), 2);
    }

    #[test]
    fn test_comments_and_quoting() {
        let cfg = Cfg::from_dot(
            "# generated\n\
             digraph \"my graph\" {\n\
                 // line comment\n\
                 \"if.then\" [entry=true, label=\"say \\\"hi\\\"\"]; /* block\n comment */\n\
                 \"if.then\" -> \"node\";\n\
                 -1 -> .5 [cond=\"1, 4\"]\n\
             }",
        )
        .unwrap();
        assert_eq!(cfg.name(), "my graph");
        let then = cfg.node_with_label("if.then").unwrap();
        assert_eq!(
            cfg.node(then).unwrap().attrs().get("label").map(String::as_str),
            Some("say \"hi\"")
        );
        assert!(cfg.node_with_label("node").is_some());
        let m = cfg.node_with_label("-1").unwrap();
        let h = cfg.node_with_label(".5").unwrap();
        assert_eq!(cfg.edge(m, h).unwrap().cond(), Some("1, 4"));
    }

    #[test]
    fn test_string_concatenation_and_continuation() {
        let cfg = Cfg::from_dot("digraph { \"ab\" + \"cd\"; \"lo\\\nng\" }").unwrap();
        assert!(cfg.node_with_label("abcd").is_some());
        assert!(cfg.node_with_label("long").is_some());
    }

    #[test]
    fn test_strict_merges_parallel_edges() {
        let cfg = Cfg::from_dot("strict digraph { A -> B [a=1]; A -> B [b=2] }").unwrap();
        let a = cfg.node_with_label("A").unwrap();
        let b = cfg.node_with_label("B").unwrap();
        assert_eq!(cfg.edge(a, b).unwrap().attrs().len(), 2);

        match Cfg::from_dot("digraph {\nA -> B\nA -> B\n}") {
            Err(Error::DotSyntax { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected DotSyntax, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_constructs() {
        for input in [
            "graph { A -- B }",
            "digraph { subgraph cluster { A } }",
            "digraph { { A B } -> C }",
            "digraph { A:n -> B }",
            "digraph { A [label=<<b>x</b>>] }",
        ] {
            assert!(
                matches!(Cfg::from_dot(input), Err(Error::NotImplemented(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_syntax_errors() {
        for input in [
            "",
            "digraph",
            "digraph {",
            "digraph { A -> }",
            "digraph { A [color] }",
            "digraph { \"open }",
            "digraph { /* open }",
            "digraph { A -- B }",
            "digraph { 1abc }",
            "digraph { } trailing",
            "digraph { A ! B }",
        ] {
            assert!(
                matches!(Cfg::from_dot(input), Err(Error::DotSyntax { .. })),
                "{input}"
            );
        }
    }

    #[test]
    fn test_second_entry_is_invalid() {
        assert!(matches!(
            Cfg::from_dot("digraph { A [entry=true]; B [entry=true] }"),
            Err(Error::InvalidCfg { .. })
        ));
    }

    #[test]
    fn test_to_dot_output() {
        let cfg = Cfg::from_dot(
            "digraph f { B; A [entry=true, color=red]; A -> B [cond=false]; A -> A [cond=true] }",
        )
        .unwrap();
        assert_eq!(
            cfg.to_dot(),
            "digraph f {\n\
             \x20   A [color=red, entry=true];\n\
             \x20   B;\n\
             \x20   A -> A [cond=true];\n\
             \x20   A -> B [cond=false];\n\
             }\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let input = r#"digraph "odd name" {
            rankdir=TB;
            "entry block" [entry=true, label="x\ly"];
            "entry block" -> "node" [cond=true];
            "entry block" -> B10 [cond=false];
            "node" -> B10;
            B10 -> "quote\"d" [cond="1, 4"];
            B10 -> B2 [cond=default];
            B2 -> "";
        }"#;
        let cfg = Cfg::from_dot(input).unwrap();
        let written = cfg.to_dot();
        let reparsed = Cfg::from_dot(&written).unwrap();
        assert_eq!(reparsed, cfg);
        assert_eq!(reparsed.name(), "odd name");
        assert_eq!(reparsed.graph_attrs(), cfg.graph_attrs());
        assert_eq!(reparsed.to_dot(), written);
    }
}
