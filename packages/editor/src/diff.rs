//! # Change Classification
//!
//! Compares the original template with the merged output and labels keys
//! as new, modified or deleted for the preview highlighter.
//!
//! [`classify`] reports keys by field name alone. The highlighter matches
//! `"key":` on serialized lines, so it has no use for paths; the cost is
//! that a name recurring at different depths keeps only the classification
//! written last. [`classify_paths`] runs the same walk with dotted paths
//! for callers that need exact locations.
//!
//! Arrays are walked like objects keyed by index (`"0"`, `"1"`, ...).

use indexmap::IndexMap;
use probation_document::DocumentValue;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    New,
    Modified,
    Deleted,
}

/// Key → change, in discovery order
pub type ChangeMap = IndexMap<String, ChangeKind>;

/// Flat, field-name keyed classification
#[instrument(skip_all)]
pub fn classify(original: &DocumentValue, current: &DocumentValue) -> ChangeMap {
    let mut changes = ChangeMap::new();
    walk(original, current, None, KeyStyle::Name, &mut changes);
    changes
}

/// Classification keyed by dotted path from the root
#[instrument(skip_all)]
pub fn classify_paths(original: &DocumentValue, current: &DocumentValue) -> ChangeMap {
    let mut changes = ChangeMap::new();
    walk(original, current, None, KeyStyle::Path, &mut changes);
    changes
}

#[derive(Clone, Copy)]
enum KeyStyle {
    Name,
    Path,
}

fn label(prefix: Option<&str>, key: &str, style: KeyStyle) -> String {
    match (style, prefix) {
        (KeyStyle::Path, Some(prefix)) => format!("{}.{}", prefix, key),
        _ => key.to_string(),
    }
}

fn walk(
    original: &DocumentValue,
    current: &DocumentValue,
    prefix: Option<&str>,
    style: KeyStyle,
    changes: &mut ChangeMap,
) {
    if !original.is_container() || !current.is_container() {
        return;
    }

    for (key, before) in original.entries() {
        let name = label(prefix, &key, style);
        match current.child(&key) {
            None => {
                changes.insert(name, ChangeKind::Deleted);
            }
            Some(after) if before.is_container() && after.is_container() => {
                let nested = match style {
                    KeyStyle::Path => Some(name.as_str()),
                    KeyStyle::Name => None,
                };
                walk(before, after, nested, style, changes);
            }
            Some(after) if before != after => {
                changes.insert(name, ChangeKind::Modified);
            }
            Some(_) => {}
        }
    }

    for (key, _) in current.entries() {
        if original.child(&key).is_none() {
            changes.insert(label(prefix, &key, style), ChangeKind::New);
        }
    }
}
