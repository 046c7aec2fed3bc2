pub mod diff;
pub mod extract;
pub mod merge;
pub mod preview;
pub mod store;

pub use diff::{diff, DiffArgs};
pub use extract::{extract, ExtractArgs};
pub use merge::{merge, MergeArgs};
pub use preview::{preview, PreviewArgs};
pub use store::{delete, list, submit, DeleteArgs, ListArgs, SubmitArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use probation_editor::{ChangeKind, Edit, EditSession};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Edits and top-level overrides shared by merge, preview and submit
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    /// JSON file holding a list of edits
    #[arg(short, long)]
    pub edits: Option<PathBuf>,

    /// Experiment name to write into the output
    #[arg(long)]
    pub name: Option<String>,

    /// Hardware generation to write into the output
    #[arg(long)]
    pub generation: Option<String>,
}

/// Read a file, or stdin for `-`
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

/// Build a session from an optional template and the edit arguments
///
/// Edits that fail are reported and skipped; the rest still apply.
pub(crate) fn prepare_session(
    config: &Config,
    template: Option<&Path>,
    args: &EditArgs,
) -> Result<EditSession> {
    let mut session = config.session();

    if let Some(path) = template {
        let text = read_input(path)?;
        let count = session
            .load_template(&text)
            .with_context(|| format!("Invalid template {}", path.display()))?;
        debug!(providers = count, template = %path.display(), "Template loaded");
    }

    if let Some(name) = &args.name {
        session.set_experiment_name(name.as_str());
    }
    if let Some(generation) = &args.generation {
        session.set_generation(generation.as_str());
    }

    if let Some(path) = &args.edits {
        let content = read_input(path)?;
        let edits: Vec<Edit> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid edit list {}", path.display()))?;

        for (index, edit) in edits.iter().enumerate() {
            if let Err(err) = session.apply(edit) {
                warn!(index, edit = edit.name(), error = %err, "Edit rejected");
                eprintln!(
                    "{} edit #{} ({}): {}",
                    "Skipped".yellow().bold(),
                    index + 1,
                    edit.name(),
                    err
                );
            }
        }
    }

    Ok(session)
}

pub(crate) fn change_label(kind: ChangeKind) -> ColoredString {
    match kind {
        ChangeKind::New => "new".green().bold(),
        ChangeKind::Modified => "modified".yellow().bold(),
        ChangeKind::Deleted => "deleted".red().bold(),
    }
}
