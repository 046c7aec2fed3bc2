//! # Document Values
//!
//! Order-preserving representation of JSON-like data.
//!
//! Object keys keep their insertion order through parse → edit → serialize,
//! and numbers keep their textual representation (`1` never becomes `1.0`).

use crate::DocumentError;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

/// Ordered key → value map backing `DocumentValue::Object`
pub type DocumentMap = IndexMap<String, DocumentValue>;

/// A JSON-like value with ordered objects
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    Object(DocumentMap),
    Array(Vec<DocumentValue>),
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
}

impl DocumentValue {
    /// Parse JSON text
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(value.into())
    }

    /// Create an empty object
    pub fn object() -> Self {
        DocumentValue::Object(DocumentMap::new())
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> String {
        Value::from(self).to_string()
    }

    /// Serialize to pretty-printed JSON (2-space indent)
    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", Value::from(self))
    }

    /// Name of this value's variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentValue::Object(_) => "object",
            DocumentValue::Array(_) => "array",
            DocumentValue::String(_) => "string",
            DocumentValue::Number(_) => "number",
            DocumentValue::Boolean(_) => "boolean",
            DocumentValue::Null => "null",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, DocumentValue::Object(_) | DocumentValue::Array(_))
    }

    pub fn as_object(&self) -> Option<&DocumentMap> {
        match self {
            DocumentValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut DocumentMap> {
        match self {
            DocumentValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<DocumentValue>> {
        match self {
            DocumentValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<DocumentValue>> {
        match self {
            DocumentValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocumentValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative integer value, accepting numeric strings
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            DocumentValue::Number(n) => n.as_u64(),
            DocumentValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Look up a field of an object
    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        self.as_object()?.get(key)
    }

    /// Look up a field of an object mutably
    pub fn get_mut(&mut self, key: &str) -> Option<&mut DocumentValue> {
        self.as_object_mut()?.get_mut(key)
    }

    /// Object field by name or array element by index
    pub fn child(&self, segment: &str) -> Option<&DocumentValue> {
        match self {
            DocumentValue::Object(map) => map.get(segment),
            DocumentValue::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut DocumentValue> {
        match self {
            DocumentValue::Object(map) => map.get_mut(segment),
            DocumentValue::Array(items) => items.get_mut(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }

    /// Follow a path of object keys / array indices
    ///
    /// ```rust,ignore
    /// doc.pointer(&["definition", "targetGoals", "0", "actions"])
    /// ```
    pub fn pointer(&self, path: &[&str]) -> Option<&DocumentValue> {
        path.iter().try_fold(self, |value, segment| value.child(segment))
    }

    pub fn pointer_mut(&mut self, path: &[&str]) -> Option<&mut DocumentValue> {
        path.iter()
            .try_fold(self, |value, segment| value.child_mut(segment))
    }

    /// Child entries of a container, with array indices rendered as keys
    pub fn entries(&self) -> Vec<(String, &DocumentValue)> {
        match self {
            DocumentValue::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            DocumentValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Textual rendering used for form fields
    ///
    /// Strings are returned verbatim, null renders as an empty string and
    /// containers render as compact JSON.
    pub fn to_text(&self) -> String {
        match self {
            DocumentValue::String(s) => s.clone(),
            DocumentValue::Number(n) => n.to_string(),
            DocumentValue::Boolean(b) => b.to_string(),
            DocumentValue::Null => String::new(),
            DocumentValue::Object(_) | DocumentValue::Array(_) => self.to_json(),
        }
    }

    /// Value for `text`, reusing `existing` when it already renders as `text`
    pub fn from_text(existing: Option<&DocumentValue>, text: &str) -> DocumentValue {
        match existing {
            Some(value) if value.to_text() == text => value.clone(),
            _ => DocumentValue::String(text.to_string()),
        }
    }

    /// Require an object, reporting the actual kind otherwise
    pub fn expect_object(&self) -> Result<&DocumentMap, DocumentError> {
        self.as_object().ok_or(DocumentError::UnexpectedKind {
            expected: "object",
            found: self.kind(),
        })
    }
}

impl Default for DocumentValue {
    fn default() -> Self {
        DocumentValue::Null
    }
}

impl fmt::Display for DocumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.to_json_pretty())
        } else {
            write!(f, "{}", self.to_json())
        }
    }
}

// ── serde_json conversions ────────────────────────────────────────────

impl From<Value> for DocumentValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                DocumentValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            Value::Array(items) => DocumentValue::Array(items.into_iter().map(Into::into).collect()),
            Value::String(s) => DocumentValue::String(s),
            Value::Number(n) => DocumentValue::Number(n),
            Value::Bool(b) => DocumentValue::Boolean(b),
            Value::Null => DocumentValue::Null,
        }
    }
}

impl From<&DocumentValue> for Value {
    fn from(value: &DocumentValue) -> Self {
        match value {
            DocumentValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
            DocumentValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            DocumentValue::String(s) => Value::String(s.clone()),
            DocumentValue::Number(n) => Value::Number(n.clone()),
            DocumentValue::Boolean(b) => Value::Bool(*b),
            DocumentValue::Null => Value::Null,
        }
    }
}

impl From<DocumentValue> for Value {
    fn from(value: DocumentValue) -> Self {
        Value::from(&value)
    }
}

impl From<&str> for DocumentValue {
    fn from(s: &str) -> Self {
        DocumentValue::String(s.to_string())
    }
}

impl From<String> for DocumentValue {
    fn from(s: String) -> Self {
        DocumentValue::String(s)
    }
}

impl From<u64> for DocumentValue {
    fn from(n: u64) -> Self {
        DocumentValue::Number(n.into())
    }
}

impl From<bool> for DocumentValue {
    fn from(b: bool) -> Self {
        DocumentValue::Boolean(b)
    }
}

impl FromIterator<(String, DocumentValue)> for DocumentValue {
    fn from_iter<I: IntoIterator<Item = (String, DocumentValue)>>(iter: I) -> Self {
        DocumentValue::Object(iter.into_iter().collect())
    }
}

impl Serialize for DocumentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocumentValue::Object(map) => map.serialize(serializer),
            DocumentValue::Array(items) => items.serialize(serializer),
            DocumentValue::String(s) => serializer.serialize_str(s),
            DocumentValue::Number(n) => n.serialize(serializer),
            DocumentValue::Boolean(b) => serializer.serialize_bool(*b),
            DocumentValue::Null => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for DocumentValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Into::into)
    }
}
