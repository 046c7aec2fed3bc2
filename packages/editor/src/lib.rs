//! # Probation Editor
//!
//! Template-driven experiment payload synthesizer for the "Custom CRC
//! Request" builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ upload: JSON text → DocumentValue           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ extractor: goals → Provider[]               │
//! │ session: freeze original doc + form state   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ edit store: upserts, tombstones, loops      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ merge: original + edits → full document     │
//! │ diff: original vs output → change map       │
//! │ highlight: change map → decorated lines     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Originals are frozen**: the uploaded document and the load-time form
//!    state are never mutated; merges deep-copy
//! 2. **Merges are pure**: every preview re-derives the output from the
//!    originals and the live edit state
//! 3. **Order is preserved**: existing keys keep their position, new keys
//!    are appended
//! 4. **Deletes are reversible**: tombstones hide keys from output until
//!    restored
//!
//! ## Usage
//!
//! ```rust,ignore
//! use probation_editor::{Edit, EditSession, ProviderId};
//!
//! let mut session = EditSession::new();
//! session.load_template(&std::fs::read_to_string("template.json")?)?;
//!
//! session.apply(&Edit::SetParameter {
//!     provider_id: ProviderId::from("provider-0"),
//!     key: "state".to_string(),
//!     value: "Burnin".to_string(),
//! })?;
//!
//! let preview = session.preview();
//! println!("{}", preview.text);
//! ```

mod defaults;
mod diff;
mod edit_store;
mod errors;
mod extractor;
mod highlight;
mod merge;
mod mutations;
mod pipeline;
mod provider;
mod session;
pub mod template;

pub use defaults::{synthesize, SynthesisDefaults, CRC_EXPERIMENT_ACTION, NODE_GENERATION_FILTER, NODE_STATE_FILTER, SKU_FILTER};
pub use diff::{classify, classify_paths, ChangeKind, ChangeMap};
pub use edit_store::{ParameterChange, ParameterEditStore, ParameterState};
pub use errors::{EditError, EditorError};
pub use extractor::extract;
pub use highlight::{deleted_keys, render, HighlightedLine};
pub use merge::MergeEngine;
pub use mutations::{Edit, EditResult};
pub use pipeline::Preview;
pub use provider::{
    GoalKind, IdAllocator, LoopParameters, ParameterMap, Provider, ProviderId, ProviderRole, LOOP_PROVIDER_TYPE,
};
pub use session::{EditSession, LoadedTemplate, OriginalFormState, Submission};
pub use template::TopLevelFields;

// Re-export the document model for convenience
pub use probation_document::{DocumentError, DocumentMap, DocumentValue};
