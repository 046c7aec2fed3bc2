//! Directory of pretty-printed JSON records, one file per experiment

use crate::{ExperimentRecord, ExperimentStore, StoreError, StoreResult};
use chrono::Utc;
use probation_document::DocumentValue;
use probation_editor::Submission;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a record file; only UUID ids map into the store directory
    fn record_path(&self, id: &str) -> StoreResult<PathBuf> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))?;
        Ok(self.dir.join(format!("{}.json", id.hyphenated())))
    }

    fn read(&self, path: &Path) -> StoreResult<ExperimentRecord> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, record: &ExperimentRecord) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(&record.id)?, content)?;
        Ok(())
    }
}

impl ExperimentStore for JsonFileStore {
    fn insert(&mut self, submission: &Submission) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let record = ExperimentRecord::from_submission(id.clone(), submission, Utc::now());
        self.write(&record)?;
        debug!(id = %id, dir = %self.dir.display(), "Stored experiment");
        Ok(id)
    }

    fn list(&self) -> StoreResult<Vec<ExperimentRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            match self.read(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    fn update(&mut self, id: &str, payload: &DocumentValue) -> StoreResult<()> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let mut record = self.read(&path)?;
        record.full_payload = payload.clone();
        record.updated_at = Utc::now();
        self.write(&record)
    }

    fn delete(&mut self, id: &str) -> StoreResult<()> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}
