mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Structure {
            paths,
            method,
            output_dir,
            dot,
            steps,
        } => commands::structure::run(
            paths,
            &commands::structure::StructureOptions {
                method: *method,
                output_dir: output_dir.as_deref(),
                dot: *dot,
                steps: *steps,
                global: &cli.global,
            },
        ),
        Command::Intervals { path } => commands::intervals::run(path, &cli.global),
    }
}

fn main() {
    if let Err(err) = ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    }) {
        eprintln!("restructure: failed to set Ctrl+C handler: {err}");
    }

    let cli = Cli::parse();

    // Warnings and above on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("restructure: {err:#}");
        std::process::exit(1);
    }
}
