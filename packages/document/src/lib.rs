//! # Probation Document
//!
//! Order-preserving JSON document model shared by the payload editor,
//! the experiment store and the CLI.
//!
//! Experiment templates are uploaded as arbitrary JSON. Field order is part
//! of what operators review, so every value in this crate keeps object keys
//! in their original order and numbers in their original representation.
//!
//! ```rust,ignore
//! use probation_document::DocumentValue;
//!
//! let doc = DocumentValue::parse(r#"{"definition": {"experimentName": "burn-in"}}"#)?;
//! let name = doc.pointer(&["definition", "experimentName"]);
//! println!("{}", doc.to_json_pretty());
//! ```

mod error;
mod value;

pub use error::DocumentError;
pub use value::{DocumentMap, DocumentValue};
