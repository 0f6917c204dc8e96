use std::{
    ops::ControlFlow,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use restructure::{
    analysis::{analyze, analyze_all, analyze_hammock_with, Analysis, Cfg, MergeObserver, Strategy},
    primitive::Primitive,
    utils::graph::GraphBase,
};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{file_display_name, load_graph, output_path},
    output::{print_output, Align, Columns},
};

pub struct StructureOptions<'a> {
    pub method: Strategy,
    pub output_dir: Option<&'a Path>,
    pub dot: bool,
    pub steps: bool,
    pub global: &'a GlobalOptions,
}

#[derive(Debug, Serialize)]
struct IncompleteOutput {
    remaining: usize,
    cancelled: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    graph: String,
    method: String,
    primitives: Vec<Primitive>,
    incomplete: Option<IncompleteOutput>,
}

/// Logs every hammock merge and optionally dumps the graph after each one.
pub struct LoggingObserver<'a> {
    graph: String,
    dump: Option<(&'a Path, Option<&'a Path>)>,
    step: usize,
    error: Option<anyhow::Error>,
}

impl<'a> LoggingObserver<'a> {
    pub fn new(graph: &str) -> Self {
        Self {
            graph: graph.to_string(),
            dump: None,
            step: 0,
            error: None,
        }
    }

    /// Write `<name>.step<N>.dot` after every merge.
    pub fn dump_steps(mut self, input: &'a Path, output_dir: Option<&'a Path>) -> Self {
        self.dump = Some((input, output_dir));
        self
    }

    fn write_step(&self, cfg: &Cfg) -> anyhow::Result<PathBuf> {
        let Some((input, output_dir)) = self.dump else {
            bail!("no step output configured");
        };
        let path = output_path(input, output_dir, &format!("step{}.dot", self.step));
        std::fs::write(&path, cfg.to_dot())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl MergeObserver for LoggingObserver<'_> {
    fn before(&mut self, cfg: &Cfg, primitive: &Primitive) -> ControlFlow<()> {
        log::debug!(
            "{}: merging {} at '{}' ({} nodes)",
            self.graph,
            primitive.kind(),
            primitive.entry(),
            cfg.node_count()
        );
        ControlFlow::Continue(())
    }

    fn after(&mut self, cfg: &Cfg, _primitive: &Primitive) -> ControlFlow<()> {
        self.step += 1;
        if self.dump.is_none() {
            return ControlFlow::Continue(());
        }
        match self.write_step(cfg) {
            Ok(path) => {
                log::debug!("{}: wrote {}", self.graph, path.display());
                ControlFlow::Continue(())
            }
            Err(err) => {
                self.error = Some(err);
                ControlFlow::Break(())
            }
        }
    }
}

fn structure_one(
    path: &Path,
    cfg: &mut Cfg,
    opts: &StructureOptions<'_>,
) -> anyhow::Result<Analysis> {
    if opts.method != Strategy::Hammock {
        return Ok(analyze(cfg, opts.method)?);
    }

    let mut observer = LoggingObserver::new(cfg.name());
    if opts.steps {
        observer = observer.dump_steps(path, opts.output_dir);
    }
    let analysis = analyze_hammock_with(cfg, &mut observer)?;
    if let Some(err) = observer.error {
        return Err(err);
    }
    Ok(analysis)
}

fn finish(
    path: &Path,
    mut cfg: Cfg,
    analysis: Analysis,
    opts: &StructureOptions<'_>,
) -> anyhow::Result<FileReport> {
    if let Some(incomplete) = &analysis.incomplete {
        log::warn!(
            "{}: structuring incomplete, {} nodes left",
            file_display_name(path),
            incomplete.remaining
        );
    }

    if opts.dot {
        if opts.method == Strategy::Interval {
            cfg.export_annotations();
        }
        let out = output_path(path, opts.output_dir, "structured.dot");
        std::fs::write(&out, cfg.to_dot())
            .with_context(|| format!("failed to write {}", out.display()))?;
        log::info!("wrote {}", out.display());
    }

    Ok(FileReport {
        file: file_display_name(path),
        graph: cfg.name().to_string(),
        method: opts.method.to_string(),
        incomplete: analysis.incomplete.map(|i| IncompleteOutput {
            remaining: i.remaining,
            cancelled: i.cancelled,
        }),
        primitives: analysis.primitives,
    })
}

pub fn run(paths: &[PathBuf], opts: &StructureOptions<'_>) -> anyhow::Result<()> {
    if opts.steps && opts.method != Strategy::Hammock {
        bail!("--steps requires --method hammock");
    }
    if let Some(dir) = opts.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let graphs = paths
        .iter()
        .map(|p| load_graph(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut reports = Vec::with_capacity(paths.len());
    if paths.len() == 1 || opts.steps {
        for (path, mut cfg) in paths.iter().zip(graphs) {
            let analysis = structure_one(path, &mut cfg, opts)
                .with_context(|| format!("failed to structure {}", path.display()))?;
            reports.push(finish(path, cfg, analysis, opts)?);
        }
    } else {
        for (path, result) in paths.iter().zip(analyze_all(graphs, opts.method)) {
            let (cfg, analysis) =
                result.with_context(|| format!("failed to structure {}", path.display()))?;
            reports.push(finish(path, cfg, analysis, opts)?);
        }
    }

    print_output(&reports, opts.global, |reports| {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_report(report);
        }
    })
}

fn print_report(report: &FileReport) {
    println!(
        "{} ({}): {} primitives",
        report.file,
        report.method,
        report.primitives.len()
    );
    if let Some(incomplete) = &report.incomplete {
        let reason = if incomplete.cancelled {
            "cancelled"
        } else {
            "no pattern matches"
        };
        println!("  incomplete: {} nodes left, {reason}", incomplete.remaining);
    }
    if report.primitives.is_empty() {
        return;
    }

    let mut table = Columns::new(
        "  ",
        &[
            ("#", Align::Right),
            ("prim", Align::Left),
            ("entry", Align::Left),
            ("exit", Align::Left),
            ("roles", Align::Left),
        ],
    );
    for (i, primitive) in report.primitives.iter().enumerate() {
        let roles = primitive
            .nodes()
            .iter()
            .map(|(role, label)| format!("{role}={label}"))
            .collect::<Vec<_>>()
            .join(" ");
        table.push([
            (i + 1).to_string(),
            primitive.kind().to_string(),
            primitive.entry().to_string(),
            primitive.exit().unwrap_or("-").to_string(),
            roles,
        ]);
    }
    table.print();
}
