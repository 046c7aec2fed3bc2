//! # Edit Session
//!
//! One operator's "Custom CRC Request" form.
//!
//! Loading a template freezes two originals: the full document and the
//! form state extracted from it. Edits only touch the live providers and
//! tombstones in the [`ParameterEditStore`]; every preview or submission
//! re-derives the output from the frozen originals plus the live state.

use crate::defaults::SynthesisDefaults;
use crate::edit_store::{ParameterChange, ParameterEditStore};
use crate::errors::EditorError;
use crate::extractor;
use crate::merge::MergeEngine;
use crate::mutations::{Edit, EditResult};
use crate::pipeline::Preview;
use crate::provider::Provider;
use crate::template::{TopLevelFields, DEFINITION};
use probation_document::DocumentValue;
use serde::Serialize;
use tracing::{info, warn};

/// Form state captured when the template was loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalFormState {
    pub experiment_name: String,
    pub generation: String,
    pub providers: Vec<Provider>,
}

/// The frozen originals of one upload
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    original: DocumentValue,
    form: OriginalFormState,
}

impl LoadedTemplate {
    pub fn original(&self) -> &DocumentValue {
        &self.original
    }

    pub fn form(&self) -> &OriginalFormState {
        &self.form
    }
}

/// Payload handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub experiment_name: String,
    pub generation: String,
    /// Providers with deleted parameters removed
    pub filter_providers: Vec<Provider>,
    pub full_payload: DocumentValue,
}

pub struct EditSession {
    store: ParameterEditStore,
    template: Option<LoadedTemplate>,
    top: TopLevelFields,
    defaults: SynthesisDefaults,
}

impl EditSession {
    pub fn new() -> Self {
        Self::with_store(ParameterEditStore::new())
    }

    pub fn with_store(store: ParameterEditStore) -> Self {
        Self {
            store,
            template: None,
            top: TopLevelFields::default(),
            defaults: SynthesisDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: SynthesisDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Load an uploaded template, returning the number of extracted providers
    ///
    /// Invalid JSON or a missing `definition` leaves the session untouched.
    /// A template without providers is adopted, but the current provider
    /// list is kept.
    pub fn load_template(&mut self, text: &str) -> Result<usize, EditorError> {
        let doc = DocumentValue::parse(text)?;
        match doc.get(DEFINITION) {
            Some(DocumentValue::Object(_)) => {}
            Some(other) => {
                return Err(EditorError::MalformedTemplate(format!(
                    "`definition` must be an object, found {}",
                    other.kind()
                )))
            }
            None => {
                return Err(EditorError::MalformedTemplate(
                    "missing `definition`".to_string(),
                ))
            }
        }

        let providers = extractor::extract(&doc, self.store.id_allocator());
        let top = TopLevelFields::from_document(&doc);
        let count = providers.len();

        let baseline = if providers.is_empty() {
            warn!("Template has no providers, keeping the current form");
            self.template
                .as_ref()
                .map(|t| t.form.providers.clone())
                .unwrap_or_default()
        } else {
            self.store.replace_providers(providers.clone());
            providers
        };

        info!(
            providers = count,
            experiment = %top.experiment_name,
            generation = %top.generation,
            "Loaded template"
        );

        self.template = Some(LoadedTemplate {
            original: doc,
            form: OriginalFormState {
                experiment_name: top.experiment_name.clone(),
                generation: top.generation.clone(),
                providers: baseline,
            },
        });
        self.top = top;
        Ok(count)
    }

    /// Discard the template and all edits
    pub fn clear(&mut self) {
        self.template = None;
        self.store.clear();
        self.top = TopLevelFields::default();
    }

    pub fn template(&self) -> Option<&LoadedTemplate> {
        self.template.as_ref()
    }

    pub fn original(&self) -> Option<&DocumentValue> {
        self.template.as_ref().map(|t| &t.original)
    }

    pub fn store(&self) -> &ParameterEditStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParameterEditStore {
        &mut self.store
    }

    pub fn providers(&self) -> &[Provider] {
        self.store.providers()
    }

    pub fn top_level(&self) -> &TopLevelFields {
        &self.top
    }

    pub fn set_experiment_name(&mut self, name: impl Into<String>) {
        self.top.experiment_name = name.into();
    }

    pub fn set_generation(&mut self, generation: impl Into<String>) {
        self.top.generation = generation.into();
    }

    pub fn apply(&mut self, edit: &Edit) -> Result<EditResult, EditorError> {
        let result = edit.apply(&mut self.store)?;
        tracing::debug!(edit = edit.name(), provider = %result.provider_id, "Applied edit");
        Ok(result)
    }

    /// Parameter keys that differ from the load-time form
    pub fn parameter_changes(&self) -> Vec<ParameterChange> {
        let baseline = self
            .template
            .as_ref()
            .map(|t| t.form.providers.as_slice())
            .unwrap_or_default();
        self.store.changes(baseline)
    }

    /// Full output document for the current edit state
    pub fn merged_document(&self) -> DocumentValue {
        MergeEngine::new(&self.store)
            .with_defaults(self.defaults.clone())
            .merge(self.original(), &self.top)
    }

    pub fn preview(&self) -> Preview {
        Preview::build(self.original(), self.merged_document())
    }

    pub fn submission(&self) -> Submission {
        let full_payload = self.merged_document();
        let top = TopLevelFields::from_document(&full_payload);
        Submission {
            experiment_name: top.experiment_name,
            generation: top.generation,
            filter_providers: self.store.cleaned_providers(),
            full_payload,
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
