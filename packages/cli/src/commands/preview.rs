use super::{change_label, prepare_session, EditArgs};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use probation_editor::{ChangeKind, HighlightedLine};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Template JSON file (`-` for stdin); omit to preview the default document
    pub template: Option<PathBuf>,

    #[command(flatten)]
    pub edits: EditArgs,

    /// Only print changed lines
    #[arg(long)]
    pub changed_only: bool,
}

pub fn preview(args: PreviewArgs, config: &Config) -> Result<()> {
    let session = prepare_session(config, args.template.as_deref(), &args.edits)?;
    let preview = session.preview();

    for line in &preview.lines {
        if args.changed_only && line.change.is_none() {
            continue;
        }
        print_line(line);
    }

    println!();
    if !preview.has_changes() {
        println!("{} No changes", "✓".green());
        return Ok(());
    }

    for (key, kind) in &preview.changes {
        println!("{:>10}  {}", change_label(*kind), key);
    }

    let deleted = preview.deleted_keys();
    if !deleted.is_empty() {
        println!();
        println!("{}", "Removed from output:".red().bold());
        for key in deleted {
            println!("    {}", key.red().strikethrough());
        }
    }

    Ok(())
}

fn print_line(line: &HighlightedLine) {
    let number = format!("{:>4}", line.number).dimmed();
    let text = match line.change {
        Some(ChangeKind::New) => line.text.green(),
        Some(ChangeKind::Modified) => line.text.yellow(),
        Some(ChangeKind::Deleted) => line.text.red(),
        None => line.text.normal(),
    };
    println!("{} │ {}", number, text);
}
