//! Building a [`Cfg`] from front-end basic blocks.
//!
//! The front-end boundary is narrow: a block has a name, an
//! instruction count and a terminator naming its successors. Everything the
//! structurer needs (edges, branch conditions, the entry, the `cond_node`
//! hint) is derived from that.

use crate::{
    analysis::cfg::{
        graph::Cfg,
        node::{Attrs, Node, ATTR_COND, ATTR_COND_NODE, ATTR_ENTRY},
    },
    utils::graph::NodeId,
    Error, Result,
};

/// How control leaves a basic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// Function return
    Return,
    /// Control never leaves the block (e.g. a call to a `noreturn` function)
    Unreachable,
    /// Unconditional branch
    Jump(String),
    /// Two-way conditional branch
    Branch {
        /// Target when the condition holds
        if_true: String,
        /// Target when it does not
        if_false: String,
    },
    /// Multi-way branch
    Switch {
        /// `(case expression, target)` pairs, in source order
        cases: Vec<(String, String)>,
        /// Target when no case matches
        default: String,
    },
    /// A terminator the front-end cannot translate, named by its mnemonic
    Unsupported(String),
}

impl Terminator {
    /// Returns the `(target, cond)` pairs of the outgoing edges.
    ///
    /// Cases that lead to the same block are joined into one case expression;
    /// when the default target is also reached by cases, the edge is the default.
    fn targets(&self) -> Result<Vec<(&str, Option<String>)>> {
        let mut out: Vec<(&str, Option<String>)> = Vec::new();
        match self {
            Terminator::Return | Terminator::Unreachable => {}
            Terminator::Jump(target) => out.push((target, None)),
            Terminator::Branch { if_true, if_false } => {
                if if_true == if_false {
                    out.push((if_true, None));
                } else {
                    out.push((if_true, Some("true".to_string())));
                    out.push((if_false, Some("false".to_string())));
                }
            }
            Terminator::Switch { cases, default } => {
                for (value, target) in cases {
                    if target == default {
                        continue;
                    }
                    match out.iter_mut().find(|(t, _)| *t == target.as_str()) {
                        Some((_, Some(expr))) => {
                            expr.push_str(", ");
                            expr.push_str(value);
                        }
                        _ => out.push((target, Some(value.clone()))),
                    }
                }
                out.push((default, Some("default".to_string())));
            }
            Terminator::Unsupported(mnemonic) => {
                return Err(Error::NotImplemented(format!("terminator '{mnemonic}'")));
            }
        }
        Ok(out)
    }
}

/// A basic block as handed over by an IR front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrBlock {
    /// Block name; becomes the node label
    pub name: String,
    /// Number of instructions, terminator included
    pub instruction_count: usize,
    /// How the block ends
    pub terminator: Terminator,
}

impl IrBlock {
    /// Creates a block holding only its terminator.
    pub fn new(name: impl Into<String>, terminator: Terminator) -> Self {
        IrBlock {
            name: name.into(),
            instruction_count: 1,
            terminator,
        }
    }
}

impl Cfg {
    /// Builds a control flow graph from the basic blocks of one function.
    ///
    /// The first block is the entry. Every block becomes one node labelled by its
    /// name; 2-way branches produce `cond="true"` / `cond="false"` edges and
    /// switches produce one edge per distinct target carrying the case
    /// expression, or `"default"`. A block with more than one instruction is
    /// marked `cond_node="false"` since it is more than a bare condition.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCfg`] for an empty block list, duplicate block names or
    ///   a branch to an unknown block
    /// - [`Error::NotImplemented`] for [`Terminator::Unsupported`]
    ///
    /// # Examples
    ///
    /// ```rust
    /// use restructure::analysis::{Cfg, IrBlock, Terminator};
    /// use restructure::utils::graph::GraphBase;
    ///
    /// let blocks = vec![
    ///     IrBlock::new("entry", Terminator::Branch { if_true: "then".into(), if_false: "end".into() }),
    ///     IrBlock::new("then", Terminator::Jump("end".into())),
    ///     IrBlock::new("end", Terminator::Return),
    /// ];
    /// let cfg = Cfg::from_blocks("f", &blocks).unwrap();
    /// assert_eq!(cfg.node_count(), 3);
    /// assert_eq!(cfg.entry(), cfg.node_with_label("entry"));
    /// ```
    pub fn from_blocks(name: impl Into<String>, blocks: &[IrBlock]) -> Result<Cfg> {
        if blocks.is_empty() {
            return Err(invalid_cfg!("cannot build a CFG from an empty block list"));
        }

        let mut cfg = Cfg::new(name);

        // First pass: one node per block
        let mut ids: Vec<NodeId> = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            let mut attrs = Attrs::new();
            if index == 0 {
                attrs.insert(ATTR_ENTRY.to_string(), "true".to_string());
            }
            if block.instruction_count > 1 {
                attrs.insert(ATTR_COND_NODE.to_string(), "false".to_string());
            }
            ids.push(cfg.add_node(Node::with_attrs(block.name.clone(), attrs))?);
        }

        // Second pass: edges from terminators
        for (block, &from) in blocks.iter().zip(&ids) {
            for (target, cond) in block.terminator.targets()? {
                let Some(to) = cfg.node_with_label(target) else {
                    return Err(invalid_cfg!(
                        "block '{}' branches to unknown block '{}'",
                        block.name,
                        target
                    ));
                };
                let mut attrs = Attrs::new();
                if let Some(cond) = cond {
                    attrs.insert(ATTR_COND.to_string(), cond);
                }
                cfg.add_edge(from, to, attrs)?;
            }
        }

        Ok(cfg)
    }
}
