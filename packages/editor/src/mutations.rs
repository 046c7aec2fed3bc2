//! # Parameter Edits
//!
//! Serializable operator edits, so a batch of form changes can be stored,
//! replayed against a freshly loaded template, or passed to the CLI as a
//! JSON file:
//!
//! ```json
//! [
//!   { "op": "setParameter", "providerId": "provider-0", "key": "state", "value": "Burnin" },
//!   { "op": "deleteParameter", "providerId": "provider-1", "key": "legacyFlag" }
//! ]
//! ```

use crate::edit_store::ParameterEditStore;
use crate::errors::EditError;
use crate::provider::{GoalKind, ParameterMap, ProviderId, ProviderRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Edit {
    /// Insert or overwrite a parameter
    SetParameter {
        provider_id: ProviderId,
        key: String,
        value: String,
    },

    /// Tombstone a parameter
    DeleteParameter { provider_id: ProviderId, key: String },

    /// Undo a tombstone
    RestoreParameter { provider_id: ProviderId, key: String },

    SetLoopCount { provider_id: ProviderId, count: u32 },

    SetLoopParameter {
        provider_id: ProviderId,
        key: String,
        values: Vec<String>,
    },

    AddProvider {
        #[serde(rename = "type")]
        provider_type: String,
        role: ProviderRole,
        #[serde(default)]
        goal: GoalKind,
        #[serde(default)]
        parameters: ParameterMap,
    },

    RemoveProvider { provider_id: ProviderId },
}

/// Outcome of an applied edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditResult {
    /// Provider the edit touched (the new id for `AddProvider`)
    pub provider_id: ProviderId,
}

impl Edit {
    pub fn apply(&self, store: &mut ParameterEditStore) -> Result<EditResult, EditError> {
        let provider_id = match self {
            Edit::SetParameter { provider_id, key, value } => {
                store.set_parameter(provider_id, key, value.clone())?;
                provider_id.clone()
            }
            Edit::DeleteParameter { provider_id, key } => {
                store.delete(provider_id, key)?;
                provider_id.clone()
            }
            Edit::RestoreParameter { provider_id, key } => {
                store.restore(provider_id, key)?;
                provider_id.clone()
            }
            Edit::SetLoopCount { provider_id, count } => {
                store.set_loop_count(provider_id, *count)?;
                provider_id.clone()
            }
            Edit::SetLoopParameter { provider_id, key, values } => {
                store.set_loop_parameter(provider_id, key, values.clone())?;
                provider_id.clone()
            }
            Edit::AddProvider {
                provider_type,
                role,
                goal,
                parameters,
            } => store.add_provider(provider_type.clone(), *role, *goal, parameters.clone()),
            Edit::RemoveProvider { provider_id } => {
                store.remove_provider(provider_id)?;
                provider_id.clone()
            }
        };

        Ok(EditResult { provider_id })
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Edit::SetParameter { .. } => "setParameter",
            Edit::DeleteParameter { .. } => "deleteParameter",
            Edit::RestoreParameter { .. } => "restoreParameter",
            Edit::SetLoopCount { .. } => "setLoopCount",
            Edit::SetLoopParameter { .. } => "setLoopParameter",
            Edit::AddProvider { .. } => "addProvider",
            Edit::RemoveProvider { .. } => "removeProvider",
        }
    }
}
