//! DOT format utilities for graph exchange.
//!
//! This module provides the lexical helpers shared by the DOT reader and writer:
//! escaping of quoted strings and the decision whether an identifier can be
//! written bare or has to be quoted.

/// Keywords of the DOT language. They are case-insensitive and cannot be used as bare ids.
const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Escapes a string for use inside a quoted DOT id.
///
/// Only the two characters that would end or corrupt the quoted string are escaped.
/// Everything else, including newlines and Graphviz label escapes such as `\l`, is
/// written as-is so that [`unescape_dot`] restores the exact input.
///
/// # Arguments
///
/// * `s` - The string to escape
///
/// # Returns
///
/// A new string with `\` and `"` escaped.
///
/// # Examples
///
/// ```rust
/// use restructure::utils::escape_dot;
///
/// let escaped = escape_dot("say \"hi\"");
/// assert_eq!(escaped, "say \\\"hi\\\"");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Reverses [`escape_dot`] on the contents of a quoted DOT id.
///
/// `\"` becomes `"` and `\\` becomes `\`. Any other backslash sequence is left
/// untouched, as Graphviz interprets those itself.
#[must_use]
pub fn unescape_dot(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_id_char(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

fn is_numeral(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    let mut parts = body.splitn(2, '.');
    let int = parts.next().unwrap_or_default();
    let frac = parts.next();
    let digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    match frac {
        None => !int.is_empty() && digits(int),
        Some(frac) => digits(int) && digits(frac) && !(int.is_empty() && frac.is_empty()),
    }
}

/// Returns `true` if `s` may be written as a bare (unquoted) DOT id.
///
/// Bare ids are alphanumeric strings not starting with a digit, or numerals.
/// Keywords are never bare.
#[must_use]
pub fn is_bare_id(s: &str) -> bool {
    if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s)) {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_id_start(c) => chars.all(is_id_char),
        Some(_) => is_numeral(s),
        None => false,
    }
}

/// Formats `s` as a DOT id, quoting and escaping it only when required.
///
/// # Examples
///
/// ```rust
/// use restructure::utils::quote_id;
///
/// assert_eq!(quote_id("B1"), "B1");
/// assert_eq!(quote_id("if.then"), "\"if.then\"");
/// assert_eq!(quote_id("node"), "\"node\"");
/// ```
#[must_use]
pub fn quote_id(s: &str) -> String {
    if is_bare_id(s) {
        s.to_string()
    } else {
        format!("\"{}\"", escape_dot(s))
    }
}

/// Returns `true` if `s` is a DOT keyword (case-insensitive).
#[must_use]
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s))
}
