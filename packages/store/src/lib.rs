//! # Probation Store
//!
//! Persistence for submitted experiment payloads.
//!
//! The editor only hands finished [`Submission`]s to an [`ExperimentStore`];
//! nothing in the merge pipeline depends on how records are kept. A failed
//! store call leaves the edit session untouched, so the operator can simply
//! resubmit.

mod error;
mod file;
mod memory;
mod record;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{ExperimentRecord, ExperimentStatus};

use probation_document::DocumentValue;
use probation_editor::Submission;

/// Sink and source of experiment records
pub trait ExperimentStore {
    /// Store a submission, returning the new record id
    fn insert(&mut self, submission: &Submission) -> StoreResult<String>;

    /// All records, oldest first
    fn list(&self) -> StoreResult<Vec<ExperimentRecord>>;

    /// Replace a record's payload
    fn update(&mut self, id: &str, payload: &DocumentValue) -> StoreResult<()>;

    fn delete(&mut self, id: &str) -> StoreResult<()>;
}
