//! Control flow edge types for the CFG.
//!
//! An [`Edge`] carries its endpoints and a DOT attribute map. The `cond`
//! attribute says which way of a branch the edge belongs to; [`BranchKind`]
//! is its parsed form and defines the canonical successor order.

use std::{cmp::Ordering, fmt};

use crate::{
    analysis::cfg::node::{Attrs, ATTR_COND},
    utils::{graph::NodeId, natural_cmp},
};

/// A strongly-typed identifier for edges within a graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    /// Returns the raw index value of this edge identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// The branch an edge represents, parsed from its `cond` attribute.
///
/// The derived order is the successor order of the whole crate: `true`, `false`,
/// case expressions (natural order), unconditional, `default`.
///
/// # Examples
///
/// ```rust
/// use restructure::analysis::BranchKind;
///
/// assert!(BranchKind::True < BranchKind::False);
/// assert!(BranchKind::Case("2") < BranchKind::Case("10"));
/// assert!(BranchKind::Case("10") < BranchKind::Unconditional);
/// assert!(BranchKind::Unconditional < BranchKind::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind<'a> {
    /// The taken side of a 2-way branch (`cond="true"`)
    True,
    /// The fall-through side of a 2-way branch (`cond="false"`)
    False,
    /// A switch case; the expression may list several values (`"1, 4"`)
    Case(&'a str),
    /// No `cond` attribute
    Unconditional,
    /// The default target of a switch (`cond="default"`)
    Default,
}

impl<'a> BranchKind<'a> {
    /// Classifies a `cond` attribute value.
    #[must_use]
    pub fn from_cond(cond: Option<&'a str>) -> Self {
        match cond {
            None => BranchKind::Unconditional,
            Some("true") => BranchKind::True,
            Some("false") => BranchKind::False,
            Some("default") => BranchKind::Default,
            Some(expr) => BranchKind::Case(expr),
        }
    }

    fn rank(self) -> u8 {
        match self {
            BranchKind::True => 0,
            BranchKind::False => 1,
            BranchKind::Case(_) => 2,
            BranchKind::Unconditional => 3,
            BranchKind::Default => 4,
        }
    }

    /// Returns the `cond` attribute value producing this kind, `None` for
    /// unconditional edges.
    #[must_use]
    pub fn as_cond(self) -> Option<&'a str> {
        match self {
            BranchKind::True => Some("true"),
            BranchKind::False => Some("false"),
            BranchKind::Case(expr) => Some(expr),
            BranchKind::Unconditional => None,
            BranchKind::Default => Some("default"),
        }
    }

    /// Returns `true` for the two sides of a 2-way branch.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self, BranchKind::True | BranchKind::False)
    }

    /// Returns `true` for switch cases and the switch default.
    #[must_use]
    pub const fn is_switch(self) -> bool {
        matches!(self, BranchKind::Case(_) | BranchKind::Default)
    }
}

impl Ord for BranchKind<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (BranchKind::Case(a), BranchKind::Case(b)) => natural_cmp(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for BranchKind<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An edge in the control flow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
    pub(crate) attrs: Attrs,
}

impl Edge {
    /// Returns the source node.
    #[must_use]
    pub fn from(&self) -> NodeId {
        self.from
    }

    /// Returns the destination node.
    #[must_use]
    pub fn to(&self) -> NodeId {
        self.to
    }

    /// Returns the DOT attributes.
    #[must_use]
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Returns the raw `cond` attribute.
    #[must_use]
    pub fn cond(&self) -> Option<&str> {
        self.attrs.get(ATTR_COND).map(String::as_str)
    }

    /// Returns the parsed `cond` attribute.
    #[must_use]
    pub fn kind(&self) -> BranchKind<'_> {
        BranchKind::from_cond(self.cond())
    }

    /// Returns `true` if the edge starts and ends at the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
