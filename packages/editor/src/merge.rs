//! # Merge Engine
//!
//! Recombines edited providers with the uploaded template.
//!
//! The template is deep-copied and its provider slots are walked in
//! extraction order. Each slot takes the next parameter set registered for
//! its type (round-robin, wrapping when slots outnumber parameter sets) and
//! merges it in place:
//!
//! - existing keys keep their position; edited values overwrite them
//! - keys only present in the edit set are appended in edit order
//! - keys absent from the edit set are left alone
//! - tombstoned keys are removed
//!
//! Preconditions, actions and filters are separate passes with their own
//! cursors, so one type can appear in several roles. A slot is visited only
//! if extraction would have made a provider from it (see
//! [`template::is_precondition_slot`] and [`template::is_provider_slot`]);
//! anything else passes through untouched. Slots whose provider was
//! removed are dropped, together with the filters of a removed action.
//!
//! With no template loaded, a default document is synthesized instead
//! (see [`crate::defaults`]).

use crate::defaults::{self, SynthesisDefaults};
use crate::edit_store::ParameterEditStore;
use crate::provider::{ParameterMap, Provider, ProviderRole};
use crate::template::{self, TopLevelFields, ACTIONS, ENVIRONMENT_QUERY, LOOP_COUNT, LOOP_PARAMETERS, PARAMETERS, PRECONDITIONS, TYPE};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use probation_document::{DocumentMap, DocumentValue};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

/// One provider's contribution to a merge pass
#[derive(Debug)]
pub(crate) struct ParameterSet<'a> {
    pub provider: &'a Provider,
    /// Parameters with tombstoned keys removed
    pub parameters: ParameterMap,
    pub tombstones: BTreeSet<String>,
}

/// Parameter sets of one role, grouped by provider type
#[derive(Debug, Default)]
pub(crate) struct ParameterPool<'a> {
    sets: IndexMap<&'a str, Vec<ParameterSet<'a>>>,
    cursors: HashMap<&'a str, usize>,
}

impl<'a> ParameterPool<'a> {
    pub fn for_role(store: &'a ParameterEditStore, role: ProviderRole) -> Self {
        let mut pool = Self::default();
        for provider in store.providers().iter().filter(|p| p.role == role) {
            let mut parameters = store.clean_parameters(&provider.id, &provider.parameters);
            if role == ProviderRole::Action {
                parameters.shift_remove(ENVIRONMENT_QUERY);
            }
            pool.sets
                .entry(provider.provider_type.as_str())
                .or_default()
                .push(ParameterSet {
                    provider,
                    parameters,
                    tombstones: store.tombstones(&provider.id).cloned().unwrap_or_default(),
                });
        }
        pool
    }

    /// Next parameter set for `provider_type`, wrapping around
    pub fn next(&mut self, provider_type: &str) -> Option<&ParameterSet<'a>> {
        let (key, sets) = self.sets.get_key_value(provider_type)?;
        if sets.is_empty() {
            return None;
        }
        let cursor = self.cursors.entry(*key).or_insert(0);
        let set = &sets[*cursor % sets.len()];
        *cursor += 1;
        Some(set)
    }

    /// Types that were never consumed by a slot
    pub fn unconsumed(&self) -> impl Iterator<Item = &ParameterSet<'a>> {
        self.sets
            .iter()
            .filter(|(ty, _)| !self.cursors.contains_key(*ty))
            .flat_map(|(_, sets)| sets.iter())
    }
}

/// Builds output documents from a template and the live edit state
pub struct MergeEngine<'a> {
    store: &'a ParameterEditStore,
    defaults: SynthesisDefaults,
}

impl<'a> MergeEngine<'a> {
    pub fn new(store: &'a ParameterEditStore) -> Self {
        Self {
            store,
            defaults: SynthesisDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: SynthesisDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Merge the live edits into `original`, or synthesize a default document
    pub fn merge(&self, original: Option<&DocumentValue>, top: &TopLevelFields) -> DocumentValue {
        self.merge_at(original, top, Utc::now())
    }

    /// Like [`MergeEngine::merge`] with an explicit clock for the synthesized
    /// document's timestamps
    #[instrument(skip_all, fields(providers = self.store.providers().len(), template = original.is_some()))]
    pub fn merge_at(&self, original: Option<&DocumentValue>, top: &TopLevelFields, now: DateTime<Utc>) -> DocumentValue {
        match original {
            Some(original) => self.merge_template(original, top),
            None => {
                info!("No template loaded, synthesizing default document");
                defaults::synthesize(self.store, top, &self.defaults, now)
            }
        }
    }

    fn merge_template(&self, original: &DocumentValue, top: &TopLevelFields) -> DocumentValue {
        let mut doc = original.clone();
        top.apply_to(&mut doc);

        let mut walk = SlotWalk::new(self.store);

        for goal in template::GOALS {
            if let Some(slots) = template::slot_list_mut(&mut doc, goal, PRECONDITIONS) {
                slots.retain_mut(|slot| walk.precondition(slot));
            }
        }

        for goal in template::GOALS {
            if let Some(slots) = template::slot_list_mut(&mut doc, goal, ACTIONS) {
                slots.retain_mut(|slot| walk.action(slot));
            }
        }

        debug!(slots = walk.merged, dropped = walk.dropped, "Merged provider slots");
        doc
    }
}

/// Visits template slots in extraction order, counting slot ordinals per role
///
/// Each visitor returns whether the slot stays in the output.
struct SlotWalk<'a> {
    store: &'a ParameterEditStore,
    preconditions: ParameterPool<'a>,
    actions: ParameterPool<'a>,
    filters: ParameterPool<'a>,
    ordinals: HashMap<ProviderRole, usize>,
    merged: usize,
    dropped: usize,
}

impl<'a> SlotWalk<'a> {
    fn new(store: &'a ParameterEditStore) -> Self {
        Self {
            store,
            preconditions: ParameterPool::for_role(store, ProviderRole::Precondition),
            actions: ParameterPool::for_role(store, ProviderRole::Action),
            filters: ParameterPool::for_role(store, ProviderRole::Filter),
            ordinals: HashMap::new(),
            merged: 0,
            dropped: 0,
        }
    }

    /// Ordinal of the next slot of `role`; true when its provider was removed
    fn next_removed(&mut self, role: ProviderRole) -> bool {
        let ordinal = self.ordinals.entry(role).or_insert(0);
        let removed = self.store.is_slot_removed(role, *ordinal);
        *ordinal += 1;
        removed
    }

    fn precondition(&mut self, slot: &mut DocumentValue) -> bool {
        if !template::is_precondition_slot(slot) {
            return true;
        }
        if self.next_removed(ProviderRole::Precondition) {
            self.dropped += 1;
            return false;
        }
        self.merged += merge_slot(slot, &mut self.preconditions) as usize;
        true
    }

    fn action(&mut self, slot: &mut DocumentValue) -> bool {
        if !template::is_provider_slot(slot) {
            return true;
        }
        let removed = self.next_removed(ProviderRole::Action);
        if !removed {
            self.merged += merge_slot(slot, &mut self.actions) as usize;
        }
        if let Some(nested) = template::action_filters_mut(slot) {
            nested.retain_mut(|filter| self.filter(filter, removed));
        }
        if removed {
            self.dropped += 1;
        }
        !removed
    }

    /// Filters of a removed action still advance the ordinal
    fn filter(&mut self, slot: &mut DocumentValue, owner_removed: bool) -> bool {
        if !template::is_provider_slot(slot) {
            return true;
        }
        if self.next_removed(ProviderRole::Filter) && !owner_removed {
            self.dropped += 1;
            return false;
        }
        if !owner_removed {
            self.merged += merge_slot(slot, &mut self.filters) as usize;
        }
        true
    }
}

/// Merge the next matching parameter set into `slot`; returns whether one was found
pub(crate) fn merge_slot(slot: &mut DocumentValue, pool: &mut ParameterPool<'_>) -> bool {
    let Some(provider_type) = slot.get(TYPE).and_then(DocumentValue::as_str).map(str::to_string) else {
        return false;
    };
    let Some(set) = pool.next(&provider_type) else {
        return false;
    };
    let Some(fields) = slot.as_object_mut() else {
        return false;
    };

    match fields.get_mut(PARAMETERS) {
        Some(DocumentValue::Object(existing)) => {
            merge_parameters(existing, &set.parameters, &set.tombstones);
        }
        Some(other) => {
            warn!(provider_type = %provider_type, kind = other.kind(), "Slot parameters are not an object, skipping");
        }
        None if !set.parameters.is_empty() => {
            let mut created = DocumentMap::new();
            merge_parameters(&mut created, &set.parameters, &set.tombstones);
            fields.insert(PARAMETERS.to_string(), DocumentValue::Object(created));
        }
        None => {}
    }

    write_loop(fields, set.provider);
    true
}

/// Key-order-preserving parameter merge
pub(crate) fn merge_parameters(target: &mut DocumentMap, edits: &ParameterMap, tombstones: &BTreeSet<String>) {
    for (key, value) in target.iter_mut() {
        if let Some(edit) = edits.get(key) {
            *value = DocumentValue::from_text(Some(&*value), edit);
        }
    }
    for (key, edit) in edits {
        if !target.contains_key(key) {
            target.insert(key.clone(), DocumentValue::String(edit.clone()));
        }
    }
    target.retain(|key, _| !tombstones.contains(key));
}

/// Write `loopCount` / `loopParameters` when the provider carries them
pub(crate) fn write_loop(fields: &mut DocumentMap, provider: &Provider) {
    if let Some(count) = provider.loop_count {
        let value = match fields.get(LOOP_COUNT) {
            Some(existing) if existing.to_text() == count.to_string() => existing.clone(),
            _ => DocumentValue::from(u64::from(count)),
        };
        fields.insert(LOOP_COUNT.to_string(), value);
    }

    let Some(loop_parameters) = &provider.loop_parameters else {
        return;
    };

    if let Some(count) = provider.loop_count {
        for (key, values) in loop_parameters {
            if values.len() != count as usize {
                warn!(
                    provider = %provider.id,
                    key = %key,
                    expected = count,
                    actual = values.len(),
                    "Loop parameter length does not match loop count"
                );
            }
        }
    }

    let target = fields
        .entry(LOOP_PARAMETERS.to_string())
        .or_insert_with(DocumentValue::object);
    let Some(target) = target.as_object_mut() else {
        warn!(provider = %provider.id, "loopParameters is not an object, skipping");
        return;
    };

    for (key, values) in loop_parameters {
        let existing = target.get(key).and_then(DocumentValue::as_array);
        let merged: Vec<DocumentValue> = values
            .iter()
            .enumerate()
            .map(|(i, text)| DocumentValue::from_text(existing.and_then(|items| items.get(i)), text))
            .collect();
        target.insert(key.clone(), DocumentValue::Array(merged));
    }
}
