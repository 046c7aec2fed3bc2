mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    delete, diff, extract, list, merge, preview, submit, DeleteArgs, DiffArgs, ExtractArgs,
    ListArgs, MergeArgs, PreviewArgs, SubmitArgs,
};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Probation CLI - Experiment payload editor for hardware probation runs
#[derive(Parser, Debug)]
#[command(name = "probation")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the editable providers of a template
    Extract(ExtractArgs),

    /// Apply edits to a template and print the merged document
    Merge(MergeArgs),

    /// Classify the key changes between two documents
    Diff(DiffArgs),

    /// Show the merged document with changed lines highlighted
    Preview(PreviewArgs),

    /// Merge and store an experiment
    Submit(SubmitArgs),

    /// List stored experiments
    List(ListArgs),

    /// Delete a stored experiment
    Delete(DeleteArgs),
}

/// Log to stderr, filtered by `PROBATION_LOG` (default `warn`)
fn initialize_tracing() {
    let filter = EnvFilter::try_from_env("PROBATION_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;
    let config = Config::load(&cwd)
        .with_context(|| format!("Invalid {}", config::DEFAULT_CONFIG_NAME))?;

    match cli.command {
        Command::Extract(args) => extract(args, &config),
        Command::Merge(args) => merge(args, &config),
        Command::Diff(args) => diff(args),
        Command::Preview(args) => preview(args, &config),
        Command::Submit(args) => submit(args, &config, &cwd),
        Command::List(args) => list(args, &config, &cwd),
        Command::Delete(args) => delete(args, &config, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    initialize_tracing();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
