//! Error types for the editor

use probation_document::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    #[error("Edit error: {0}")]
    Edit(#[from] EditError),
}

impl From<DocumentError> for EditorError {
    fn from(e: DocumentError) -> Self {
        EditorError::MalformedTemplate(e.to_string())
    }
}

/// Rejected operator edits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Parameter key must not be empty")]
    EmptyKey,

    #[error("Provider {0} is not a loop provider")]
    NotALoopProvider(String),

    #[error("Loop count must be at least 1, got {0}")]
    InvalidLoopCount(u32),

    #[error("Loop parameter {key} needs {expected} values, got {actual}")]
    LoopCardinality {
        key: String,
        expected: usize,
        actual: usize,
    },
}
