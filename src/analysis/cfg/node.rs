//! Node types of the control flow graph.
//!
//! A [`Node`] is one basic block: its label, its DOT attributes and the
//! [`StructInfo`] annotations written by the interval passes.

use std::{collections::BTreeMap, fmt};

use strum::{Display, EnumString};

use crate::utils::graph::NodeId;

/// Attribute map of nodes, edges and graphs.
///
/// Ordered by key so that DOT output and equality are independent of insertion order.
pub type Attrs = BTreeMap<String, String>;

/// Attribute marking the entry node (`entry="true"`).
pub const ATTR_ENTRY: &str = "entry";
/// Edge attribute holding the branch condition.
pub const ATTR_COND: &str = "cond";
/// Node attribute controlling [`StructInfo::is_cond_node`]; only `"false"` clears it.
pub const ATTR_COND_NODE: &str = "cond_node";

/// Loop classification written by the loop structuring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LoopType {
    /// Not a loop header
    #[default]
    None,
    /// Pre-tested loop (`while`)
    Pre,
    /// Post-tested loop (`do .. while`)
    Post,
    /// Loop without an exit condition
    Endless,
}

/// A contracted short-circuit predicate.
///
/// Leaves name the basic blocks whose branch conditions are combined. The
/// [`Display`](fmt::Display) form is what a back-end prints, e.g. `A AND NOT B`;
/// compound operands are parenthesised.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::CondExpr;
///
/// let inner = CondExpr::or(CondExpr::leaf("A"), CondExpr::leaf("B"));
/// let expr = CondExpr::and(inner, CondExpr::not(CondExpr::leaf("C")));
/// assert_eq!(expr.to_string(), "(A OR B) AND NOT C");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CondExpr {
    /// The branch condition of the named block
    Leaf(String),
    /// Negation
    Not(Box<CondExpr>),
    /// Short-circuit conjunction
    And(Box<CondExpr>, Box<CondExpr>),
    /// Short-circuit disjunction
    Or(Box<CondExpr>, Box<CondExpr>),
}

impl CondExpr {
    /// Creates a leaf for the condition of block `label`.
    pub fn leaf(label: impl Into<String>) -> Self {
        CondExpr::Leaf(label.into())
    }

    /// Creates `NOT expr`.
    #[must_use]
    pub fn not(expr: CondExpr) -> Self {
        CondExpr::Not(Box::new(expr))
    }

    /// Creates `a AND b`.
    #[must_use]
    pub fn and(a: CondExpr, b: CondExpr) -> Self {
        CondExpr::And(Box::new(a), Box::new(b))
    }

    /// Creates `a OR b`.
    #[must_use]
    pub fn or(a: CondExpr, b: CondExpr) -> Self {
        CondExpr::Or(Box::new(a), Box::new(b))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondExpr::And(..) | CondExpr::Or(..) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for CondExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondExpr::Leaf(label) => f.write_str(label),
            CondExpr::Not(inner) => {
                f.write_str("NOT ")?;
                inner.fmt_operand(f)
            }
            CondExpr::And(a, b) => {
                a.fmt_operand(f)?;
                f.write_str(" AND ")?;
                b.fmt_operand(f)
            }
            CondExpr::Or(a, b) => {
                a.fmt_operand(f)?;
                f.write_str(" OR ")?;
                b.fmt_operand(f)
            }
        }
    }
}

/// Structuring annotations of a node.
///
/// Written by [`Cfg::init_dfs_numbers`](crate::analysis::Cfg::init_dfs_numbers)
/// and the interval passes, read by the back-end. Back-references are node ids
/// into the same graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInfo {
    /// DFS pre-order number
    pub pre_num: usize,
    /// DFS post-order number
    pub post_num: usize,
    /// Reverse post-order number
    pub rev_post_num: usize,
    /// Header of the innermost loop containing this node
    pub loop_head: Option<NodeId>,
    /// Loop kind, set on loop headers only
    pub loop_type: LoopType,
    /// First node after the loop, set on loop headers only
    pub loop_follow: Option<NodeId>,
    /// Reconvergence node of a 2-way or n-way conditional
    pub follow: Option<NodeId>,
    /// The block holds nothing but its conditional branch
    pub is_cond_node: bool,
    /// The block is the source of a loop back-edge
    pub is_loop_latch: bool,
    /// Compound predicate contracted into this node
    pub comp_cond: Option<CondExpr>,
}

impl Default for StructInfo {
    fn default() -> Self {
        StructInfo {
            pre_num: 0,
            post_num: 0,
            rev_post_num: 0,
            loop_head: None,
            loop_type: LoopType::None,
            loop_follow: None,
            follow: None,
            is_cond_node: true,
            is_loop_latch: false,
            comp_cond: None,
        }
    }
}

impl StructInfo {
    /// Fresh annotations for a node with the given attributes.
    pub(crate) fn for_attrs(attrs: &Attrs) -> Self {
        StructInfo {
            is_cond_node: attrs.get(ATTR_COND_NODE).map_or(true, |v| v != "false"),
            ..StructInfo::default()
        }
    }
}

/// A basic block of the control flow graph.
///
/// The label is the block name and identifies the node across graph versions:
/// merges keep the label of the merged entry, and derived graphs reuse header labels.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::{Cfg, Node};
///
/// let mut cfg = Cfg::new("f");
/// let id = cfg.add_node(Node::new("B0").with_attr("entry", "true")).unwrap();
/// assert_eq!(cfg.entry(), Some(id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) label: String,
    pub(crate) attrs: Attrs,
    pub(crate) info: StructInfo,
}

impl Node {
    /// Creates a node without attributes.
    pub fn new(label: impl Into<String>) -> Self {
        Node {
            label: label.into(),
            attrs: Attrs::new(),
            info: StructInfo::default(),
        }
    }

    /// Creates a node with the given attributes.
    pub fn with_attrs(label: impl Into<String>, attrs: Attrs) -> Self {
        let info = StructInfo::for_attrs(&attrs);
        Node {
            label: label.into(),
            attrs,
            info,
        }
    }

    /// Adds one attribute, builder style.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self.info = StructInfo::for_attrs(&self.attrs);
        self
    }

    /// Returns the block label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the DOT attributes.
    #[must_use]
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Returns the structuring annotations.
    #[must_use]
    pub fn info(&self) -> &StructInfo {
        &self.info
    }

    /// Returns `true` if the node carries `entry="true"`.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.attrs.get(ATTR_ENTRY).is_some_and(|v| v == "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cond_expr_rendering() {
        let a = || CondExpr::leaf("A");
        let b = || CondExpr::leaf("B");

        assert_eq!(CondExpr::and(a(), b()).to_string(), "A AND B");
        assert_eq!(CondExpr::or(a(), CondExpr::not(b())).to_string(), "A OR NOT B");
        assert_eq!(
            CondExpr::and(CondExpr::and(a(), b()), CondExpr::leaf("C")).to_string(),
            "(A AND B) AND C"
        );
        assert_eq!(
            CondExpr::not(CondExpr::or(a(), b())).to_string(),
            "NOT (A OR B)"
        );
    }

    #[test]
    fn test_cond_node_attribute() {
        assert!(Node::new("A").info().is_cond_node);
        assert!(Node::new("A").with_attr("cond_node", "true").info().is_cond_node);
        assert!(Node::new("A").with_attr("cond_node", "yes").info().is_cond_node);
        assert!(!Node::new("A").with_attr("cond_node", "false").info().is_cond_node);
    }

    #[test]
    fn test_entry_attribute() {
        assert!(Node::new("A").with_attr("entry", "true").is_entry());
        assert!(!Node::new("A").with_attr("entry", "false").is_entry());
        assert!(!Node::new("A").is_entry());
    }

    #[test]
    fn test_loop_type_names() {
        assert_eq!(LoopType::Pre.to_string(), "pre");
        assert_eq!(LoopType::Endless.to_string(), "endless");
        assert_eq!("post".parse::<LoopType>().unwrap(), LoopType::Post);
        assert_eq!(LoopType::default(), LoopType::None);
    }
}
