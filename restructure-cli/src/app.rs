use std::path::PathBuf;

use clap::{Parser, Subcommand};
use restructure::analysis::Strategy;

/// restructure - control flow structuring for decompilers
#[derive(Debug, Parser)]
#[command(name = "restructure", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Structure one or more control flow graphs given as DOT files.
    Structure {
        /// Paths to the DOT files.
        #[arg(value_name = "FILE", required = true)]
        paths: Vec<PathBuf>,

        /// Structuring method: hammock or interval.
        #[arg(short, long, default_value_t = Strategy::Hammock)]
        method: Strategy,

        /// Directory for DOT output; defaults to the directory of each input.
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Write the structured graph as `<name>.structured.dot`.
        #[arg(long)]
        dot: bool,

        /// Write the graph after every hammock merge as `<name>.step<N>.dot`.
        #[arg(long)]
        steps: bool,
    },

    /// Print the intervals of every graph in the derived sequence.
    Intervals {
        /// Path to the DOT file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}
