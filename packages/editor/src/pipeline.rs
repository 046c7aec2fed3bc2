//! # Preview Pipeline
//!
//! Merge → serialize → classify → highlight, re-run from scratch on every
//! preview, download and submission. Nothing is cached between runs.

use crate::diff::{self, ChangeMap};
use crate::highlight::{self, HighlightedLine};
use probation_document::DocumentValue;
use serde::Serialize;

/// Everything the preview pane shows
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub document: DocumentValue,
    /// Pretty-printed document
    pub text: String,
    /// Changes relative to the uploaded template (empty without one)
    pub changes: ChangeMap,
    pub lines: Vec<HighlightedLine>,
}

impl Preview {
    pub fn build(original: Option<&DocumentValue>, document: DocumentValue) -> Self {
        let text = document.to_json_pretty();
        let changes = original
            .map(|original| diff::classify(original, &document))
            .unwrap_or_default();
        let lines = highlight::render(&text, &changes);

        Self {
            document,
            text,
            changes,
            lines,
        }
    }

    pub fn deleted_keys(&self) -> Vec<&str> {
        highlight::deleted_keys(&self.changes)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}
