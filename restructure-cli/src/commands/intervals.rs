use std::path::Path;

use anyhow::Context;
use restructure::{analysis::derived_sequence, utils::graph::GraphBase};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{file_display_name, load_graph},
    output::{print_output, Align, Columns},
};

#[derive(Debug, Serialize)]
struct IntervalOutput {
    header: String,
    nodes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LevelOutput {
    level: usize,
    node_count: usize,
    intervals: Vec<IntervalOutput>,
}

#[derive(Debug, Serialize)]
struct IntervalsOutput {
    file: String,
    reducible: bool,
    levels: Vec<LevelOutput>,
}

pub fn run(path: &Path, global: &GlobalOptions) -> anyhow::Result<()> {
    let cfg = load_graph(path)?;
    let seq = derived_sequence(&cfg)
        .with_context(|| format!("failed to decompose {}", path.display()))?;

    let levels = seq
        .graphs()
        .iter()
        .zip(seq.intervals())
        .enumerate()
        .map(|(i, (graph, intervals))| LevelOutput {
            level: i + 1,
            node_count: graph.node_count(),
            intervals: intervals
                .iter()
                .map(|interval| IntervalOutput {
                    header: graph.label(interval.header()).to_string(),
                    nodes: interval
                        .nodes()
                        .iter()
                        .map(|n| graph.label(*n).to_string())
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let output = IntervalsOutput {
        file: file_display_name(path),
        reducible: seq.is_reducible(),
        levels,
    };

    print_output(&output, global, |output| {
        println!(
            "{}: {} levels, {}",
            output.file,
            output.levels.len(),
            if output.reducible {
                "reducible"
            } else {
                "irreducible"
            }
        );
        for level in &output.levels {
            println!();
            println!("  G{} ({} nodes)", level.level, level.node_count);
            let mut table =
                Columns::new("    ", &[("header", Align::Left), ("nodes", Align::Left)]);
            for interval in &level.intervals {
                table.push([interval.header.clone(), interval.nodes.join(" ")]);
            }
            table.print();
        }
    })
}
