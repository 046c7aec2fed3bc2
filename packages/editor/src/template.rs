//! # Template Layout
//!
//! Field names and navigation helpers for experiment definition documents:
//!
//! ```text
//! { definition: { experimentName, metadata: { generation },
//!                 targetGoals:  [{ preconditions: [...], actions: [...] }],
//!                 controlGoals: [{ preconditions: [...], actions: [...] }] } }
//! ```
//!
//! Every helper returns `None` on a shape mismatch; callers treat that as
//! "nothing here" rather than an error.

use crate::provider::GoalKind;
use probation_document::DocumentValue;

pub const DEFINITION: &str = "definition";
pub const EXPERIMENT_NAME: &str = "experimentName";
pub const METADATA: &str = "metadata";
pub const GENERATION: &str = "generation";
pub const TARGET_GOALS: &str = "targetGoals";
pub const CONTROL_GOALS: &str = "controlGoals";
pub const PRECONDITIONS: &str = "preconditions";
pub const ACTIONS: &str = "actions";
pub const TYPE: &str = "type";
pub const PARAMETERS: &str = "parameters";
pub const LOOP_COUNT: &str = "loopCount";
pub const LOOP_PARAMETERS: &str = "loopParameters";
pub const ENVIRONMENT_QUERY: &str = "environmentQuery";
pub const FILTERS: &str = "filters";

/// Goal lists in traversal order
pub const GOALS: [GoalKind; 2] = [GoalKind::Target, GoalKind::Control];

pub fn goal_key(goal: GoalKind) -> &'static str {
    match goal {
        GoalKind::Target => TARGET_GOALS,
        GoalKind::Control => CONTROL_GOALS,
    }
}

/// First goal of the given kind
pub fn first_goal(doc: &DocumentValue, goal: GoalKind) -> Option<&DocumentValue> {
    doc.pointer(&[DEFINITION, goal_key(goal), "0"])
}

pub fn first_goal_mut(doc: &mut DocumentValue, goal: GoalKind) -> Option<&mut DocumentValue> {
    doc.pointer_mut(&[DEFINITION, goal_key(goal), "0"])
}

/// A goal's `preconditions` or `actions` list
pub fn slot_list<'a>(doc: &'a DocumentValue, goal: GoalKind, list: &str) -> Option<&'a [DocumentValue]> {
    first_goal(doc, goal)?
        .get(list)?
        .as_array()
        .map(Vec::as_slice)
}

pub fn slot_list_mut<'a>(
    doc: &'a mut DocumentValue,
    goal: GoalKind,
    list: &str,
) -> Option<&'a mut Vec<DocumentValue>> {
    first_goal_mut(doc, goal)?.get_mut(list)?.as_array_mut()
}

/// Any object with a string `type`; actions and filters
pub fn is_provider_slot(entry: &DocumentValue) -> bool {
    entry.get(TYPE).and_then(DocumentValue::as_str).is_some()
}

/// Preconditions also need a `parameters` object
pub fn is_precondition_slot(entry: &DocumentValue) -> bool {
    is_provider_slot(entry) && entry.get(PARAMETERS).and_then(DocumentValue::as_object).is_some()
}

/// Filters nested in an action's environment query
///
/// The query is looked up inside `parameters` first, then on the action
/// itself.
pub fn action_filters(action: &DocumentValue) -> Option<&[DocumentValue]> {
    let query = action
        .pointer(&[PARAMETERS, ENVIRONMENT_QUERY])
        .or_else(|| action.get(ENVIRONMENT_QUERY))?;
    query
        .pointer(&[DEFINITION, FILTERS])?
        .as_array()
        .map(Vec::as_slice)
}

pub fn action_filters_mut(action: &mut DocumentValue) -> Option<&mut Vec<DocumentValue>> {
    let nested = action.pointer(&[PARAMETERS, ENVIRONMENT_QUERY]).is_some();
    let query = if nested {
        action.pointer_mut(&[PARAMETERS, ENVIRONMENT_QUERY])?
    } else {
        action.get_mut(ENVIRONMENT_QUERY)?
    };
    query.pointer_mut(&[DEFINITION, FILTERS])?.as_array_mut()
}

/// Top-level fields the operator edits directly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopLevelFields {
    pub experiment_name: String,
    pub generation: String,
}

impl TopLevelFields {
    pub fn new(experiment_name: impl Into<String>, generation: impl Into<String>) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            generation: generation.into(),
        }
    }

    /// Read `definition.experimentName` and `definition.metadata.generation`
    pub fn from_document(doc: &DocumentValue) -> Self {
        let read = |path: &[&str]| doc.pointer(path).map(DocumentValue::to_text).unwrap_or_default();
        Self {
            experiment_name: read(&[DEFINITION, EXPERIMENT_NAME]),
            generation: read(&[DEFINITION, METADATA, GENERATION]),
        }
    }

    /// Write non-blank fields into `doc`, keeping existing values otherwise
    pub fn apply_to(&self, doc: &mut DocumentValue) {
        let Some(definition) = doc.get_mut(DEFINITION).and_then(DocumentValue::as_object_mut) else {
            return;
        };

        if !self.experiment_name.trim().is_empty() {
            let value = DocumentValue::from_text(definition.get(EXPERIMENT_NAME), &self.experiment_name);
            definition.insert(EXPERIMENT_NAME.to_string(), value);
        }

        if !self.generation.trim().is_empty() {
            let metadata = definition
                .entry(METADATA.to_string())
                .or_insert_with(DocumentValue::object);
            if let Some(metadata) = metadata.as_object_mut() {
                let value = DocumentValue::from_text(metadata.get(GENERATION), &self.generation);
                metadata.insert(GENERATION.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_found_inside_parameters() {
        let action = DocumentValue::parse(
            r#"{"type": "A", "parameters": {"environmentQuery": {"definition": {"filters": [{"type": "F"}]}}}}"#,
        )
        .unwrap();
        assert_eq!(action_filters(&action).map(|f| f.len()), Some(1));
    }

    #[test]
    fn test_filters_found_on_action() {
        let mut action = DocumentValue::parse(
            r#"{"type": "A", "parameters": {}, "environmentQuery": {"definition": {"filters": []}}}"#,
        )
        .unwrap();
        assert_eq!(action_filters(&action).map(|f| f.len()), Some(0));
        assert!(action_filters_mut(&mut action).is_some());
    }

    #[test]
    fn test_slot_predicates() {
        let typed = DocumentValue::parse(r#"{"type": "X"}"#).unwrap();
        let full = DocumentValue::parse(r#"{"type": "X", "parameters": {}}"#).unwrap();
        let untyped = DocumentValue::parse(r#"{"name": "x", "parameters": {}}"#).unwrap();

        assert!(is_provider_slot(&typed));
        assert!(!is_precondition_slot(&typed));
        assert!(is_precondition_slot(&full));
        assert!(!is_provider_slot(&untyped));
        assert!(!is_precondition_slot(&untyped));
    }

    #[test]
    fn test_blank_top_level_keeps_original() {
        let mut doc = DocumentValue::parse(
            r#"{"definition": {"experimentName": "a", "metadata": {"generation": 8}}}"#,
        )
        .unwrap();
        let before = doc.clone();
        TopLevelFields::new("  ", "").apply_to(&mut doc);
        assert_eq!(doc, before);

        TopLevelFields::new("b", "8").apply_to(&mut doc);
        assert_eq!(doc.pointer(&["definition", "experimentName"]).unwrap().as_str(), Some("b"));
        // unchanged text keeps the numeric value
        assert_eq!(
            doc.pointer(&["definition", "metadata", "generation"]),
            Some(&DocumentValue::from(8u64))
        );
    }

    #[test]
    fn test_generation_creates_metadata() {
        let mut doc = DocumentValue::parse(r#"{"definition": {}}"#).unwrap();
        TopLevelFields::new("", "Gen9").apply_to(&mut doc);
        assert_eq!(doc.to_json(), r#"{"definition":{"metadata":{"generation":"Gen9"}}}"#);
    }
}
