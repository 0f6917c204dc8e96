//! JSON codec for primitives.
//!
//! Each primitive is written as
//!
//! ```json
//! { "prim": "if_else", "nodes": { "cond": "A", ... }, "entry": "A", "exit": "D" }
//! ```
//!
//! and a list of primitives as a JSON array. `exit` is omitted when the
//! primitive has none. The role map is derived from the variant on the way out
//! and parsed back into one on the way in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    primitive::{Primitive, PrimitiveKind},
    Error, Result,
};

/// Wire form of a [`Primitive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveRecord {
    /// Primitive kind, e.g. `"pre_loop"`
    pub prim: String,
    /// Role → label mapping
    pub nodes: BTreeMap<String, String>,
    /// Label of the entry block
    pub entry: String,
    /// Label of the exit block, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,
}

impl From<Primitive> for PrimitiveRecord {
    fn from(primitive: Primitive) -> Self {
        PrimitiveRecord {
            prim: primitive.kind().to_string(),
            nodes: primitive.nodes(),
            entry: primitive.entry().to_string(),
            exit: primitive.exit().map(str::to_string),
        }
    }
}

impl TryFrom<PrimitiveRecord> for Primitive {
    type Error = Error;

    fn try_from(record: PrimitiveRecord) -> Result<Self> {
        let kind: PrimitiveKind = record
            .prim
            .parse()
            .map_err(|_| Error::NotImplemented(format!("primitive kind '{}'", record.prim)))?;
        let primitive = Primitive::from_roles(kind, record.nodes)?;

        if primitive.entry() != record.entry {
            return Err(Error::MalformedPrimitive(format!(
                "{kind} entry '{}' does not match its roles (expected '{}')",
                record.entry,
                primitive.entry()
            )));
        }
        if primitive.exit() != record.exit.as_deref() {
            return Err(Error::MalformedPrimitive(format!(
                "{kind} exit {:?} does not match its roles (expected {:?})",
                record.exit,
                primitive.exit()
            )));
        }
        Ok(primitive)
    }
}

/// Serialises a list of primitives as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialisation fails.
///
/// # Examples
///
/// ```rust
/// use restructure::primitive::{from_json, to_json, Primitive};
///
/// let prims = vec![Primitive::Seq { entry: "F".into(), exit: "G".into() }];
/// let json = to_json(&prims).unwrap();
/// assert!(json.contains("\"prim\": \"seq\""));
/// assert_eq!(from_json(&json).unwrap(), prims);
/// ```
pub fn to_json(primitives: &[Primitive]) -> Result<String> {
    Ok(serde_json::to_string_pretty(primitives)?)
}

/// Parses a JSON array of primitives.
///
/// # Errors
///
/// Returns [`Error::Json`] for malformed JSON, unknown kinds and role maps that do
/// not fit their kind.
pub fn from_json(input: &str) -> Result<Vec<Primitive>> {
    Ok(serde_json::from_str(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::LoopKind;

    #[test]
    fn test_record_layout() {
        let p = Primitive::PreLoop {
            cond: "A".into(),
            body: "B".into(),
            exit: "C".into(),
        };
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "prim": "pre_loop",
                "nodes": { "cond": "A", "body": "B", "exit": "C" },
                "entry": "A",
                "exit": "C",
            })
        );
    }

    #[test]
    fn test_exit_is_omitted_when_absent() {
        let p = Primitive::Loop {
            kind: LoopKind::Endless,
            head: "A".into(),
            latch: "B".into(),
            follow: None,
        };
        let value = serde_json::to_value(&p).unwrap();
        assert!(value.get("exit").is_none());
        assert_eq!(value["prim"], "inf_loop");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let input = r#"[{"prim": "goto", "nodes": {}, "entry": "A"}]"#;
        match from_json(input) {
            Err(Error::Json(e)) => assert!(e.to_string().contains("goto")),
            other => panic!("expected a JSON error, got {other:?}"),
        }
    }

    #[test]
    fn test_inconsistent_entry_is_rejected() {
        let input = r#"[{"prim": "seq", "nodes": {"entry": "F", "exit": "G"}, "entry": "G", "exit": "G"}]"#;
        assert!(from_json(input).is_err());
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
        assert!(from_json("[]").unwrap().is_empty());
    }
}
