use super::{prepare_session, EditArgs};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use probation_store::{ExperimentRecord, ExperimentStatus, ExperimentStore, JsonFileStore};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Template JSON file (`-` for stdin); omit to submit the default document
    pub template: Option<PathBuf>,

    #[command(flatten)]
    pub edits: EditArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record id
    pub id: String,
}

fn open_store(config: &Config, cwd: &Path) -> Result<JsonFileStore> {
    let dir = config.store_dir(cwd);
    JsonFileStore::open(&dir).with_context(|| format!("Cannot open store {}", dir.display()))
}

pub fn submit(args: SubmitArgs, config: &Config, cwd: &Path) -> Result<()> {
    let session = prepare_session(config, args.template.as_deref(), &args.edits)?;
    let submission = session.submission();

    let mut store = open_store(config, cwd)?;
    let id = store.insert(&submission)?;

    println!(
        "{} Submitted {} ({})",
        "✓".green(),
        submission.experiment_name.bold(),
        submission.generation
    );
    println!("   Id: {}", id);

    Ok(())
}

pub fn list(args: ListArgs, config: &Config, cwd: &Path) -> Result<()> {
    let store = open_store(config, cwd)?;
    let records = store.list()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No experiments in {}", store.dir().display());
        return Ok(());
    }

    for record in &records {
        print_record(record);
    }

    Ok(())
}

pub fn delete(args: DeleteArgs, config: &Config, cwd: &Path) -> Result<()> {
    let mut store = open_store(config, cwd)?;
    store.delete(&args.id)?;
    println!("{} Deleted {}", "✓".green(), args.id);
    Ok(())
}

fn print_record(record: &ExperimentRecord) {
    let status = match record.status {
        ExperimentStatus::Pending => "pending".yellow(),
        ExperimentStatus::Running => "running".cyan(),
        ExperimentStatus::Completed => "completed".green(),
        ExperimentStatus::Failed => "failed".red(),
    };
    println!(
        "{}  {:<9}  {}  {} ({})",
        record.id.dimmed(),
        status,
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.experiment_name.bold(),
        record.generation
    );
}
