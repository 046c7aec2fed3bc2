use super::{prepare_session, EditArgs};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Template JSON file (`-` for stdin); omit to synthesize the default document
    pub template: Option<PathBuf>,

    #[command(flatten)]
    pub edits: EditArgs,

    /// Write the merged document here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn merge(args: MergeArgs, config: &Config) -> Result<()> {
    let session = prepare_session(config, args.template.as_deref(), &args.edits)?;
    let text = session.merged_document().to_json_pretty();

    match args.out {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", text))
                .with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}
