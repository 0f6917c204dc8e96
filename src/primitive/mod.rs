//! Recognised control-flow primitives.
//!
//! A [`Primitive`] records one structure found by either driver: which kind it
//! is and which basic blocks play which role. Primitives reference blocks by
//! label, never by [`NodeId`](crate::utils::graph::NodeId), so they stay
//! meaningful after the graph has been rewritten by later merges.
//!
//! The role map used on the wire (`{"cond": "A", "body": "B", ...}`) is derived
//! from the variant; see [`Primitive::nodes`] and the [`json`] codec.

pub mod json;

pub use json::{from_json, to_json};

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{analysis::LoopType, Error, Result};

/// Role of the block holding the branch of a conditional or loop.
pub const ROLE_COND: &str = "cond";
/// Role of the single body of `if`, `if_return` and the hammock `pre_loop`.
pub const ROLE_BODY: &str = "body";
/// Role of the block control reaches after the structure.
pub const ROLE_EXIT: &str = "exit";
/// Role of the taken side of a 2-way branch.
pub const ROLE_BODY_TRUE: &str = "body_true";
/// Role of the fall-through side of a 2-way branch.
pub const ROLE_BODY_FALSE: &str = "body_false";
/// Role of the source of a loop back-edge.
pub const ROLE_LATCH: &str = "latch";
/// Role of the reconvergence node of a loop or switch.
pub const ROLE_FOLLOW: &str = "follow";
/// Role of a sequence's first block.
pub const ROLE_ENTRY: &str = "entry";
/// Role of the outer block of a compound condition.
pub const ROLE_COND_A: &str = "cond_a";
/// Role of the inner block of a compound condition.
pub const ROLE_COND_B: &str = "cond_b";
/// Prefix of the numbered case roles of a switch (`body_0`, `body_1`, ...).
pub const ROLE_BODY_PREFIX: &str = "body_";

/// Kind of a primitive, as written in the `prim` field of the JSON codec.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum PrimitiveKind {
    /// Two blocks executed one after the other
    #[strum(serialize = "seq")]
    Seq,
    /// 1-way conditional
    #[strum(serialize = "if")]
    If,
    /// 2-way conditional
    #[strum(serialize = "if_else")]
    IfElse,
    /// 1-way conditional whose body returns
    #[strum(serialize = "if_return")]
    IfReturn,
    /// Pre-tested loop
    #[strum(serialize = "pre_loop")]
    PreLoop,
    /// Post-tested loop
    #[strum(serialize = "post_loop")]
    PostLoop,
    /// Endless loop
    #[strum(serialize = "inf_loop")]
    InfLoop,
    /// N-way conditional
    #[strum(serialize = "switch")]
    Switch,
    /// `a AND b`
    #[strum(serialize = "comp_cond_a_AND_b")]
    CompCondAnd,
    /// `a OR b`
    #[strum(serialize = "comp_cond_a_OR_b")]
    CompCondOr,
    /// `a AND NOT b`
    #[strum(serialize = "comp_cond_a_AND_NOT_b")]
    CompCondAndNot,
    /// `a OR NOT b`
    #[strum(serialize = "comp_cond_a_OR_NOT_b")]
    CompCondOrNot,
}

/// Kind of a loop found by interval analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoopKind {
    /// Pre-tested loop: the header holds the exit test
    Pre,
    /// Post-tested loop: the latch holds the exit test
    Post,
    /// No exit test
    Endless,
}

impl From<LoopKind> for LoopType {
    fn from(kind: LoopKind) -> Self {
        match kind {
            LoopKind::Pre => LoopType::Pre,
            LoopKind::Post => LoopType::Post,
            LoopKind::Endless => LoopType::Endless,
        }
    }
}

/// Operator of a contracted short-circuit condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompCondOp {
    /// `a AND b`
    And,
    /// `a OR b`
    Or,
    /// `a AND NOT b`
    AndNot,
    /// `a OR NOT b`
    OrNot,
}

impl CompCondOp {
    fn kind(self) -> PrimitiveKind {
        match self {
            CompCondOp::And => PrimitiveKind::CompCondAnd,
            CompCondOp::Or => PrimitiveKind::CompCondOr,
            CompCondOp::AndNot => PrimitiveKind::CompCondAndNot,
            CompCondOp::OrNot => PrimitiveKind::CompCondOrNot,
        }
    }
}

/// One recognised control-flow structure.
///
/// All fields are basic-block labels. The hammock driver produces `Seq`, `If`,
/// `IfElse`, `IfReturn`, `PreLoop` and `PostLoop`; the interval driver produces
/// `CompCond`, `Switch`, `Loop`, `If` and `IfElse`.
///
/// # Examples
///
/// ```rust
/// use restructure::primitive::{Primitive, PrimitiveKind};
///
/// let p = Primitive::IfElse {
///     cond: "A".into(),
///     body_true: "B".into(),
///     body_false: "C".into(),
///     exit: "D".into(),
/// };
/// assert_eq!(p.kind(), PrimitiveKind::IfElse);
/// assert_eq!(p.entry(), "A");
/// assert_eq!(p.exit(), Some("D"));
/// assert_eq!(p.nodes()["body_false"], "C");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "json::PrimitiveRecord", into = "json::PrimitiveRecord")]
pub enum Primitive {
    /// `entry` falls through to `exit`
    Seq {
        /// First block
        entry: String,
        /// Second block
        exit: String,
    },
    /// `if (cond) body;` followed by `exit`
    If {
        /// Branch block
        cond: String,
        /// Conditionally executed block
        body: String,
        /// Reconvergence block
        exit: String,
    },
    /// `if (cond) body_true else body_false;` followed by `exit`
    IfElse {
        /// Branch block
        cond: String,
        /// Block on the true side
        body_true: String,
        /// Block on the false side
        body_false: String,
        /// Reconvergence block
        exit: String,
    },
    /// `if (cond) { body; return }` followed by `exit`
    IfReturn {
        /// Branch block
        cond: String,
        /// Returning block
        body: String,
        /// Block on the other side
        exit: String,
    },
    /// Hammock `while (cond) body;` followed by `exit`
    PreLoop {
        /// Loop test block
        cond: String,
        /// Loop body
        body: String,
        /// Block after the loop
        exit: String,
    },
    /// Hammock `do { } while (cond);` followed by `exit`
    PostLoop {
        /// Self-looping block holding the test
        cond: String,
        /// Block after the loop
        exit: String,
    },
    /// Loop found by interval analysis
    Loop {
        /// Loop kind
        kind: LoopKind,
        /// Loop header
        head: String,
        /// Source of the back-edge
        latch: String,
        /// First block after the loop, if the loop can be left
        follow: Option<String>,
    },
    /// N-way conditional
    Switch {
        /// Block holding the multi-way branch
        cond: String,
        /// Reconvergence block
        follow: String,
        /// Case targets in successor order
        bodies: Vec<String>,
    },
    /// Short-circuit condition contracted into `cond_a`
    CompCond {
        /// Operator combining the two conditions
        op: CompCondOp,
        /// Outer branch block, which receives the compound condition
        cond_a: String,
        /// Inner branch block, removed by the contraction
        cond_b: String,
        /// Target when the compound condition holds
        body_true: String,
        /// Target when it does not
        body_false: String,
    },
}

impl Primitive {
    /// Returns the kind of this primitive.
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Seq { .. } => PrimitiveKind::Seq,
            Primitive::If { .. } => PrimitiveKind::If,
            Primitive::IfElse { .. } => PrimitiveKind::IfElse,
            Primitive::IfReturn { .. } => PrimitiveKind::IfReturn,
            Primitive::PreLoop { .. } => PrimitiveKind::PreLoop,
            Primitive::PostLoop { .. } => PrimitiveKind::PostLoop,
            Primitive::Loop { kind, .. } => match kind {
                LoopKind::Pre => PrimitiveKind::PreLoop,
                LoopKind::Post => PrimitiveKind::PostLoop,
                LoopKind::Endless => PrimitiveKind::InfLoop,
            },
            Primitive::Switch { .. } => PrimitiveKind::Switch,
            Primitive::CompCond { op, .. } => op.kind(),
        }
    }

    /// Returns the label of the block through which the structure is entered.
    #[must_use]
    pub fn entry(&self) -> &str {
        match self {
            Primitive::Seq { entry, .. } => entry,
            Primitive::If { cond, .. }
            | Primitive::IfElse { cond, .. }
            | Primitive::IfReturn { cond, .. }
            | Primitive::PreLoop { cond, .. }
            | Primitive::PostLoop { cond, .. }
            | Primitive::Switch { cond, .. } => cond,
            Primitive::Loop { head, .. } => head,
            Primitive::CompCond { cond_a, .. } => cond_a,
        }
    }

    /// Returns the label of the block control reaches after the structure.
    #[must_use]
    pub fn exit(&self) -> Option<&str> {
        match self {
            Primitive::Seq { exit, .. }
            | Primitive::If { exit, .. }
            | Primitive::IfElse { exit, .. }
            | Primitive::IfReturn { exit, .. }
            | Primitive::PreLoop { exit, .. }
            | Primitive::PostLoop { exit, .. } => Some(exit),
            Primitive::Loop { follow, .. } => follow.as_deref(),
            Primitive::Switch { follow, .. } => Some(follow),
            Primitive::CompCond { .. } => None,
        }
    }

    /// Returns the role → label mapping.
    #[must_use]
    pub fn nodes(&self) -> BTreeMap<String, String> {
        let mut roles = BTreeMap::new();
        let mut put = |role: &str, label: &str| {
            roles.insert(role.to_string(), label.to_string());
        };

        match self {
            Primitive::Seq { entry, exit } => {
                put(ROLE_ENTRY, entry);
                put(ROLE_EXIT, exit);
            }
            Primitive::If { cond, body, exit }
            | Primitive::IfReturn { cond, body, exit }
            | Primitive::PreLoop { cond, body, exit } => {
                put(ROLE_COND, cond);
                put(ROLE_BODY, body);
                put(ROLE_EXIT, exit);
            }
            Primitive::IfElse {
                cond,
                body_true,
                body_false,
                exit,
            } => {
                put(ROLE_COND, cond);
                put(ROLE_BODY_TRUE, body_true);
                put(ROLE_BODY_FALSE, body_false);
                put(ROLE_EXIT, exit);
            }
            Primitive::PostLoop { cond, exit } => {
                put(ROLE_COND, cond);
                put(ROLE_EXIT, exit);
            }
            Primitive::Loop {
                head,
                latch,
                follow,
                ..
            } => {
                put(ROLE_COND, head);
                put(ROLE_LATCH, latch);
                if let Some(follow) = follow {
                    put(ROLE_FOLLOW, follow);
                }
            }
            Primitive::Switch {
                cond,
                follow,
                bodies,
            } => {
                put(ROLE_COND, cond);
                put(ROLE_FOLLOW, follow);
                for (i, body) in bodies.iter().enumerate() {
                    put(&format!("{ROLE_BODY_PREFIX}{i}"), body);
                }
            }
            Primitive::CompCond {
                cond_a,
                cond_b,
                body_true,
                body_false,
                ..
            } => {
                put(ROLE_COND_A, cond_a);
                put(ROLE_COND_B, cond_b);
                put(ROLE_BODY_TRUE, body_true);
                put(ROLE_BODY_FALSE, body_false);
            }
        }
        roles
    }

    /// Returns the distinct labels this primitive references, entry first, the
    /// rest in role order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels = vec![self.entry().to_string()];
        for label in self.nodes().into_values() {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

impl fmt::Display for Primitive {
    /// Formats as `kind(role=label, ...)`, e.g. `if(body=B, cond=A, exit=C)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind())?;
        for (i, (role, label)) in self.nodes().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{role}={label}")?;
        }
        f.write_str(")")
    }
}

fn take_role(
    roles: &mut BTreeMap<String, String>,
    role: &str,
    kind: PrimitiveKind,
) -> Result<String> {
    roles
        .remove(role)
        .ok_or_else(|| Error::MalformedPrimitive(format!("{kind} is missing role '{role}'")))
}

fn interval_loop(
    roles: &mut BTreeMap<String, String>,
    kind: PrimitiveKind,
    loop_kind: LoopKind,
) -> Result<Primitive> {
    Ok(Primitive::Loop {
        kind: loop_kind,
        head: take_role(roles, ROLE_COND, kind)?,
        latch: take_role(roles, ROLE_LATCH, kind)?,
        follow: roles.remove(ROLE_FOLLOW),
    })
}

impl Primitive {
    /// Rebuilds a primitive from its kind and role map.
    ///
    /// `pre_loop` and `post_loop` exist in two shapes: the hammock form
    /// (`cond`/`body`/`exit`, `cond`/`exit`) and the interval form
    /// (`cond`/`latch`/`follow`). The presence of `latch` selects the latter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPrimitive`] if a role is missing or left over.
    pub fn from_roles(kind: PrimitiveKind, mut roles: BTreeMap<String, String>) -> Result<Self> {
        let is_interval_loop = roles.contains_key(ROLE_LATCH);
        let r = &mut roles;

        let primitive = match kind {
            PrimitiveKind::Seq => Primitive::Seq {
                entry: take_role(r, ROLE_ENTRY, kind)?,
                exit: take_role(r, ROLE_EXIT, kind)?,
            },
            PrimitiveKind::If => Primitive::If {
                cond: take_role(r, ROLE_COND, kind)?,
                body: take_role(r, ROLE_BODY, kind)?,
                exit: take_role(r, ROLE_EXIT, kind)?,
            },
            PrimitiveKind::IfReturn => Primitive::IfReturn {
                cond: take_role(r, ROLE_COND, kind)?,
                body: take_role(r, ROLE_BODY, kind)?,
                exit: take_role(r, ROLE_EXIT, kind)?,
            },
            PrimitiveKind::IfElse => Primitive::IfElse {
                cond: take_role(r, ROLE_COND, kind)?,
                body_true: take_role(r, ROLE_BODY_TRUE, kind)?,
                body_false: take_role(r, ROLE_BODY_FALSE, kind)?,
                exit: take_role(r, ROLE_EXIT, kind)?,
            },
            PrimitiveKind::InfLoop => interval_loop(r, kind, LoopKind::Endless)?,
            PrimitiveKind::PreLoop if is_interval_loop => interval_loop(r, kind, LoopKind::Pre)?,
            PrimitiveKind::PostLoop if is_interval_loop => {
                interval_loop(r, kind, LoopKind::Post)?
            }
            PrimitiveKind::PreLoop => Primitive::PreLoop {
                cond: take_role(r, ROLE_COND, kind)?,
                body: take_role(r, ROLE_BODY, kind)?,
                exit: take_role(r, ROLE_EXIT, kind)?,
            },
            PrimitiveKind::PostLoop => Primitive::PostLoop {
                cond: take_role(r, ROLE_COND, kind)?,
                exit: take_role(r, ROLE_EXIT, kind)?,
            },
            PrimitiveKind::Switch => {
                let cond = take_role(r, ROLE_COND, kind)?;
                let follow = take_role(r, ROLE_FOLLOW, kind)?;
                let mut bodies = Vec::new();
                while let Some(body) = r.remove(&format!("{ROLE_BODY_PREFIX}{}", bodies.len())) {
                    bodies.push(body);
                }
                Primitive::Switch {
                    cond,
                    follow,
                    bodies,
                }
            }
            PrimitiveKind::CompCondAnd
            | PrimitiveKind::CompCondOr
            | PrimitiveKind::CompCondAndNot
            | PrimitiveKind::CompCondOrNot => Primitive::CompCond {
                op: match kind {
                    PrimitiveKind::CompCondAnd => CompCondOp::And,
                    PrimitiveKind::CompCondOr => CompCondOp::Or,
                    PrimitiveKind::CompCondAndNot => CompCondOp::AndNot,
                    _ => CompCondOp::OrNot,
                },
                cond_a: take_role(r, ROLE_COND_A, kind)?,
                cond_b: take_role(r, ROLE_COND_B, kind)?,
                body_true: take_role(r, ROLE_BODY_TRUE, kind)?,
                body_false: take_role(r, ROLE_BODY_FALSE, kind)?,
            },
        };

        if let Some(role) = roles.keys().next() {
            return Err(Error::MalformedPrimitive(format!(
                "{kind} has unexpected role '{role}'"
            )));
        }
        Ok(primitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_kind_names() {
        let names: Vec<String> = PrimitiveKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "seq",
                "if",
                "if_else",
                "if_return",
                "pre_loop",
                "post_loop",
                "inf_loop",
                "switch",
                "comp_cond_a_AND_b",
                "comp_cond_a_OR_b",
                "comp_cond_a_AND_NOT_b",
                "comp_cond_a_OR_NOT_b",
            ]
        );
        assert_eq!(
            "comp_cond_a_OR_NOT_b".parse::<PrimitiveKind>().unwrap(),
            PrimitiveKind::CompCondOrNot
        );
    }

    #[test]
    fn test_loop_roles() {
        let p = Primitive::Loop {
            kind: LoopKind::Endless,
            head: "A".into(),
            latch: "B".into(),
            follow: None,
        };
        assert_eq!(p.kind(), PrimitiveKind::InfLoop);
        assert_eq!(p.entry(), "A");
        assert_eq!(p.exit(), None);
        assert_eq!(p.nodes().len(), 2);
        assert_eq!(p.to_string(), "inf_loop(cond=A, latch=B)");
    }

    #[test]
    fn test_switch_roles() {
        let p = Primitive::Switch {
            cond: "S".into(),
            follow: "F".into(),
            bodies: vec!["C0".into(), "C1".into(), "F".into()],
        };
        let nodes = p.nodes();
        assert_eq!(nodes["body_2"], "F");
        assert_eq!(p.labels(), vec!["S", "C0", "C1", "F"]);
    }

    #[test]
    fn test_from_roles_distinguishes_loop_shapes() {
        let hammock = Primitive::PreLoop {
            cond: "A".into(),
            body: "B".into(),
            exit: "C".into(),
        };
        let interval = Primitive::Loop {
            kind: LoopKind::Pre,
            head: "A".into(),
            latch: "B".into(),
            follow: Some("C".into()),
        };
        for p in [hammock, interval] {
            assert_eq!(Primitive::from_roles(p.kind(), p.nodes()).unwrap(), p);
        }
    }

    #[test]
    fn test_from_roles_rejects_bad_maps() {
        let mut roles = BTreeMap::new();
        roles.insert("cond".to_string(), "A".to_string());
        assert!(matches!(
            Primitive::from_roles(PrimitiveKind::If, roles.clone()),
            Err(Error::MalformedPrimitive(_))
        ));

        roles.insert("exit".to_string(), "B".to_string());
        roles.insert("bogus".to_string(), "C".to_string());
        assert!(matches!(
            Primitive::from_roles(PrimitiveKind::PostLoop, roles),
            Err(Error::MalformedPrimitive(_))
        ));
    }

    #[test]
    fn test_comp_cond_kinds() {
        let p = Primitive::CompCond {
            op: CompCondOp::AndNot,
            cond_a: "A".into(),
            cond_b: "B".into(),
            body_true: "C".into(),
            body_false: "D".into(),
        };
        assert_eq!(p.kind().as_ref(), "comp_cond_a_AND_NOT_b");
        assert_eq!(p.exit(), None);
        assert_eq!(Primitive::from_roles(p.kind(), p.nodes()).unwrap(), p);
    }
}
