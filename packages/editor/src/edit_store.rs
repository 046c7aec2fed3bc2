//! # Parameter Edit Store
//!
//! Holds the live providers and the operator's tombstones.
//!
//! Deleting a parameter only tombstones its key: the value stays in the
//! live parameter map so it can be shown struck through and restored.
//! Everything that produces output (merge, default synthesis, submission)
//! goes through [`ParameterEditStore::clean_parameters`], which drops
//! tombstoned keys.

use crate::errors::EditError;
use crate::provider::{GoalKind, IdAllocator, ParameterMap, Provider, ProviderId, ProviderRole, LOOP_PROVIDER_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Derived state of one parameter key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterState {
    Unchanged,
    New,
    Modified,
    Deleted,
}

/// A parameter key whose state is not `Unchanged`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterChange {
    pub provider_id: ProviderId,
    pub key: String,
    pub state: ParameterState,
}

#[derive(Debug, Clone)]
pub struct ParameterEditStore {
    providers: Vec<Provider>,
    tombstones: HashMap<ProviderId, BTreeSet<String>>,
    /// Template slots whose provider was removed, per role
    removed_slots: HashMap<ProviderRole, BTreeSet<usize>>,
    ids: IdAllocator,
    loop_provider_type: String,
}

impl ParameterEditStore {
    pub fn new() -> Self {
        Self::with_loop_provider_type(LOOP_PROVIDER_TYPE)
    }

    pub fn with_loop_provider_type(loop_provider_type: impl Into<String>) -> Self {
        Self {
            providers: Vec::new(),
            tombstones: HashMap::new(),
            removed_slots: HashMap::new(),
            ids: IdAllocator::new(),
            loop_provider_type: loop_provider_type.into(),
        }
    }

    pub fn loop_provider_type(&self) -> &str {
        &self.loop_provider_type
    }

    pub fn id_allocator(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn provider(&self, id: &ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|p| &p.id == id)
    }

    fn provider_mut(&mut self, id: &ProviderId) -> Result<&mut Provider, EditError> {
        self.providers
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| EditError::ProviderNotFound(id.to_string()))
    }

    /// Replace the live providers, dropping all tombstones and removals
    pub fn replace_providers(&mut self, providers: Vec<Provider>) {
        self.providers = providers;
        self.tombstones.clear();
        self.removed_slots.clear();
    }

    /// Drop providers, tombstones and removals; ids keep counting
    pub fn clear(&mut self) {
        self.providers.clear();
        self.tombstones.clear();
        self.removed_slots.clear();
    }

    /// Upsert a parameter value, clearing any tombstone on the key
    pub fn set_parameter(&mut self, id: &ProviderId, key: &str, value: impl Into<String>) -> Result<(), EditError> {
        if key.trim().is_empty() {
            return Err(EditError::EmptyKey);
        }
        let provider = self.provider_mut(id)?;
        provider.parameters.insert(key.to_string(), value.into());
        self.restore(id, key)
    }

    /// Tombstone a key; the live value is kept
    pub fn delete(&mut self, id: &ProviderId, key: &str) -> Result<(), EditError> {
        self.provider_mut(id)?;
        self.tombstones
            .entry(id.clone())
            .or_default()
            .insert(key.to_string());
        Ok(())
    }

    /// Clear a tombstone
    pub fn restore(&mut self, id: &ProviderId, key: &str) -> Result<(), EditError> {
        self.provider_mut(id)?;
        if let Some(keys) = self.tombstones.get_mut(id) {
            keys.remove(key);
            if keys.is_empty() {
                self.tombstones.remove(id);
            }
        }
        Ok(())
    }

    pub fn is_deleted(&self, id: &ProviderId, key: &str) -> bool {
        self.tombstones
            .get(id)
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    /// Tombstoned keys of a provider
    pub fn tombstones(&self, id: &ProviderId) -> Option<&BTreeSet<String>> {
        self.tombstones.get(id)
    }

    /// `parameters` minus the keys tombstoned for `id`
    pub fn clean_parameters(&self, id: &ProviderId, parameters: &ParameterMap) -> ParameterMap {
        parameters
            .iter()
            .filter(|(key, _)| !self.is_deleted(id, key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Live providers with tombstoned keys removed
    pub fn cleaned_providers(&self) -> Vec<Provider> {
        self.providers
            .iter()
            .map(|p| Provider {
                parameters: self.clean_parameters(&p.id, &p.parameters),
                ..p.clone()
            })
            .collect()
    }

    /// Set the iteration count of a loop provider
    ///
    /// Loop parameter arrays are padded with empty values or truncated so
    /// they keep exactly `count` entries.
    pub fn set_loop_count(&mut self, id: &ProviderId, count: u32) -> Result<(), EditError> {
        if count == 0 {
            return Err(EditError::InvalidLoopCount(count));
        }
        let loop_type = self.loop_provider_type.clone();
        let provider = self.provider_mut(id)?;
        if provider.provider_type != loop_type {
            return Err(EditError::NotALoopProvider(id.to_string()));
        }

        provider.loop_count = Some(count);
        let params = provider.loop_parameters.get_or_insert_with(Default::default);
        for values in params.values_mut() {
            values.resize(count as usize, String::new());
        }
        Ok(())
    }

    /// Set one loop parameter; `values` must hold one entry per iteration
    pub fn set_loop_parameter(&mut self, id: &ProviderId, key: &str, values: Vec<String>) -> Result<(), EditError> {
        if key.trim().is_empty() {
            return Err(EditError::EmptyKey);
        }
        let loop_type = self.loop_provider_type.clone();
        let provider = self.provider_mut(id)?;
        if provider.provider_type != loop_type {
            return Err(EditError::NotALoopProvider(id.to_string()));
        }

        let expected = provider.loop_count.unwrap_or(1) as usize;
        if values.len() != expected {
            return Err(EditError::LoopCardinality {
                key: key.to_string(),
                expected,
                actual: values.len(),
            });
        }

        provider.loop_count.get_or_insert(1);
        provider
            .loop_parameters
            .get_or_insert_with(Default::default)
            .insert(key.to_string(), values);
        Ok(())
    }

    /// Append a new provider and return its id
    pub fn add_provider(
        &mut self,
        provider_type: impl Into<String>,
        role: ProviderRole,
        goal: GoalKind,
        parameters: ParameterMap,
    ) -> ProviderId {
        let id = self.ids.allocate();
        let mut provider = Provider::new(id.clone(), provider_type, role).with_goal(goal);
        provider.parameters = parameters;
        self.providers.push(provider);
        id
    }

    /// Remove a provider and, for an action, the filters it owns
    ///
    /// A removed template provider also marks its slot, so the merge drops
    /// that slot from the output instead of refilling it.
    pub fn remove_provider(&mut self, id: &ProviderId) -> Result<Provider, EditError> {
        let index = self
            .providers
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| EditError::ProviderNotFound(id.to_string()))?;
        let removed = self.providers.remove(index);
        self.forget(&removed);

        let (owned, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.providers)
            .into_iter()
            .partition(|p| p.owner.as_ref() == Some(id));
        self.providers = kept;
        for filter in &owned {
            self.forget(filter);
        }
        Ok(removed)
    }

    fn forget(&mut self, provider: &Provider) {
        self.tombstones.remove(&provider.id);
        if let Some(slot) = provider.slot {
            self.removed_slots.entry(provider.role).or_default().insert(slot);
        }
    }

    /// Whether the template slot `ordinal` of `role` lost its provider
    pub fn is_slot_removed(&self, role: ProviderRole, ordinal: usize) -> bool {
        self.removed_slots
            .get(&role)
            .map(|slots| slots.contains(&ordinal))
            .unwrap_or(false)
    }

    /// State of `key` relative to the provider's original parameters
    pub fn parameter_state(&self, original: Option<&Provider>, id: &ProviderId, key: &str) -> ParameterState {
        if self.is_deleted(id, key) {
            return ParameterState::Deleted;
        }
        let live = self.provider(id).and_then(|p| p.parameters.get(key));
        match (original.and_then(|p| p.parameters.get(key)), live) {
            (None, _) => ParameterState::New,
            (Some(before), Some(after)) if before != after => ParameterState::Modified,
            _ => ParameterState::Unchanged,
        }
    }

    /// Every changed key, compared against the load-time providers
    pub fn changes(&self, baseline: &[Provider]) -> Vec<ParameterChange> {
        let mut changes = Vec::new();
        for provider in &self.providers {
            let original = baseline.iter().find(|p| p.id == provider.id);
            for key in provider.parameters.keys() {
                let state = self.parameter_state(original, &provider.id, key);
                if state != ParameterState::Unchanged {
                    changes.push(ParameterChange {
                        provider_id: provider.id.clone(),
                        key: key.clone(),
                        state,
                    });
                }
            }
        }
        changes
    }
}

impl Default for ParameterEditStore {
    fn default() -> Self {
        Self::new()
    }
}
