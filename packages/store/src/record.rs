//! Persisted experiment records

use chrono::{DateTime, Utc};
use probation_document::DocumentValue;
use probation_editor::{Provider, Submission};
use serde::{Deserialize, Serialize};

/// Lifecycle of a submitted experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExperimentStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRecord {
    pub id: String,
    pub experiment_name: String,
    pub generation: String,
    pub filter_providers: Vec<Provider>,
    pub full_payload: DocumentValue,
    #[serde(default)]
    pub status: ExperimentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExperimentRecord {
    /// New pending record for a submission
    pub fn from_submission(id: String, submission: &Submission, now: DateTime<Utc>) -> Self {
        Self {
            id,
            experiment_name: submission.experiment_name.clone(),
            generation: submission.generation.clone(),
            filter_providers: submission.filter_providers.clone(),
            full_payload: submission.full_payload.clone(),
            status: ExperimentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
