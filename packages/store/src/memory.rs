//! In-memory store, for tests and dry runs

use crate::{ExperimentRecord, ExperimentStore, StoreError, StoreResult};
use chrono::Utc;
use probation_document::DocumentValue;
use probation_editor::Submission;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<ExperimentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExperimentStore for MemoryStore {
    fn insert(&mut self, submission: &Submission) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        self.records
            .push(ExperimentRecord::from_submission(id.clone(), submission, Utc::now()));
        Ok(id)
    }

    fn list(&self) -> StoreResult<Vec<ExperimentRecord>> {
        Ok(self.records.clone())
    }

    fn update(&mut self, id: &str, payload: &DocumentValue) -> StoreResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.full_payload = payload.clone();
        record.updated_at = Utc::now();
        Ok(())
    }

    fn delete(&mut self, id: &str) -> StoreResult<()> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
