use std::path::{Path, PathBuf};

use anyhow::Context;
use restructure::analysis::Cfg;

/// Read and parse a DOT file.
///
/// Graphs without a name are named after the file stem.
pub fn load_graph(path: &Path) -> anyhow::Result<Cfg> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut cfg =
        Cfg::from_dot(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    if cfg.name().is_empty() {
        cfg.set_name(file_stem(path));
    }
    Ok(cfg)
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

/// The file name without its extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem().map_or_else(
        || "graph".to_string(),
        |s| s.to_string_lossy().to_string(),
    )
}

/// Path of an output file derived from `input`, e.g. `out/f.structured.dot`.
///
/// Outputs land in `output_dir` if given, next to the input otherwise.
pub fn output_path(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}.{suffix}", file_stem(input)))
}
