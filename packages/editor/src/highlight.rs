//! # Preview Highlighting
//!
//! Decorates serialized document lines with the change classification.
//! A line takes the change of the first classified key whose `"key":`
//! token it contains.

use crate::diff::{ChangeKind, ChangeMap};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedLine {
    /// 1-based line number
    pub number: usize,
    pub text: String,
    pub change: Option<ChangeKind>,
}

pub fn render(text: &str, changes: &ChangeMap) -> Vec<HighlightedLine> {
    let tokens: Vec<(String, ChangeKind)> = changes
        .iter()
        .map(|(key, kind)| (format!("\"{}\":", key), *kind))
        .collect();

    text.lines()
        .enumerate()
        .map(|(i, line)| HighlightedLine {
            number: i + 1,
            text: line.to_string(),
            change: tokens
                .iter()
                .find(|(token, _)| line.contains(token.as_str()))
                .map(|(_, kind)| *kind),
        })
        .collect()
}

/// Keys that no longer appear in the output
pub fn deleted_keys(changes: &ChangeMap) -> Vec<&str> {
    changes
        .iter()
        .filter(|(_, kind)| **kind == ChangeKind::Deleted)
        .map(|(key, _)| key.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_match_key_tokens() {
        let text = "{\n  \"x\": \"1\",\n  \"y\": \"2\",\n  \"note\": \"x\"\n}";
        let changes: ChangeMap = [
            ("y".to_string(), ChangeKind::New),
            ("x".to_string(), ChangeKind::Modified),
            ("gone".to_string(), ChangeKind::Deleted),
        ]
        .into_iter()
        .collect();

        let lines = render(text, &changes);
        let marks: Vec<_> = lines.iter().map(|l| l.change).collect();
        assert_eq!(
            marks,
            vec![None, Some(ChangeKind::Modified), Some(ChangeKind::New), None, None]
        );
        assert_eq!(lines[1].number, 2);
        assert_eq!(deleted_keys(&changes), vec!["gone"]);
    }
}
