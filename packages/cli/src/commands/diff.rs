use super::{change_label, read_input};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use probation_editor::{classify, classify_paths, DocumentValue};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Original document
    pub original: PathBuf,

    /// Edited document
    pub current: PathBuf,

    /// Report full key paths instead of bare field names
    #[arg(long)]
    pub paths: bool,

    /// Print the classification as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn diff(args: DiffArgs) -> Result<()> {
    let original = load(&args.original)?;
    let current = load(&args.current)?;

    let changes = if args.paths {
        classify_paths(&original, &current)
    } else {
        classify(&original, &current)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
        return Ok(());
    }

    if changes.is_empty() {
        println!("{} No changes", "✓".green());
        return Ok(());
    }

    for (key, kind) in &changes {
        println!("{:>10}  {}", change_label(*kind), key);
    }

    Ok(())
}

fn load(path: &Path) -> Result<DocumentValue> {
    let text = read_input(path)?;
    DocumentValue::parse(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}
