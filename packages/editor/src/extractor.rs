//! # Provider Extraction
//!
//! Flattens an experiment definition into editable providers.
//!
//! Traversal order is fixed so that providers line up with the slots the
//! merge engine later walks:
//!
//! 1. first target goal: preconditions, then actions (each action followed
//!    by the filters of its environment query)
//! 2. first control goal: preconditions, then actions (with filters)
//!
//! Missing or malformed sections are skipped.

use crate::provider::{GoalKind, IdAllocator, LoopParameters, ParameterMap, Provider, ProviderRole};
use crate::template::{self, ACTIONS, ENVIRONMENT_QUERY, LOOP_COUNT, LOOP_PARAMETERS, PARAMETERS, PRECONDITIONS, TYPE};
use probation_document::DocumentValue;
use tracing::{debug, instrument};

/// Extract providers from `doc` in traversal order
///
/// Each provider records its ordinal among the slots of its role, counted
/// the same way the merge engine walks them.
#[instrument(skip_all)]
pub fn extract(doc: &DocumentValue, ids: &mut IdAllocator) -> Vec<Provider> {
    let mut providers = Vec::new();
    let (mut preconditions, mut actions, mut filters) = (0usize, 0usize, 0usize);

    for goal in template::GOALS {
        for entry in template::slot_list(doc, goal, PRECONDITIONS).unwrap_or_default() {
            if !template::is_precondition_slot(entry) {
                continue;
            }
            if let Some(mut provider) = lenient(entry, ProviderRole::Precondition, goal, ids) {
                provider.slot = Some(preconditions);
                providers.push(provider);
            }
            preconditions += 1;
        }

        for entry in template::slot_list(doc, goal, ACTIONS).unwrap_or_default() {
            if !template::is_provider_slot(entry) {
                continue;
            }
            let Some(mut provider) = lenient(entry, ProviderRole::Action, goal, ids) else {
                continue;
            };
            provider.parameters.shift_remove(ENVIRONMENT_QUERY);
            provider.slot = Some(actions);
            actions += 1;
            let owner = provider.id.clone();
            providers.push(provider);

            for filter in template::action_filters(entry).unwrap_or_default() {
                if !template::is_provider_slot(filter) {
                    continue;
                }
                if let Some(mut provider) = lenient(filter, ProviderRole::Filter, goal, ids) {
                    provider.slot = Some(filters);
                    provider.owner = Some(owner.clone());
                    providers.push(provider);
                }
                filters += 1;
            }
        }
    }

    debug!(providers = providers.len(), "Extracted providers");
    providers
}

/// Any object with a string `type`; `parameters` default to empty
fn lenient(
    entry: &DocumentValue,
    role: ProviderRole,
    goal: GoalKind,
    ids: &mut IdAllocator,
) -> Option<Provider> {
    let provider_type = entry.get(TYPE)?.as_str()?;

    let parameters: ParameterMap = entry
        .get(PARAMETERS)
        .and_then(DocumentValue::as_object)
        .map(|params| params.iter().map(|(k, v)| (k.clone(), v.to_text())).collect())
        .unwrap_or_default();

    let loop_count = entry
        .get(LOOP_COUNT)
        .and_then(DocumentValue::as_u64)
        .and_then(|n| u32::try_from(n).ok());

    let loop_parameters = entry
        .get(LOOP_PARAMETERS)
        .and_then(DocumentValue::as_object)
        .map(|params| {
            params
                .iter()
                .map(|(k, v)| (k.clone(), loop_values(v)))
                .collect::<LoopParameters>()
        });

    let mut provider = Provider::new(ids.allocate(), provider_type, role).with_goal(goal);
    provider.parameters = parameters;
    provider.loop_count = loop_count;
    provider.loop_parameters = loop_parameters;
    Some(provider)
}

fn loop_values(value: &DocumentValue) -> Vec<String> {
    match value.as_array() {
        Some(items) => items.iter().map(DocumentValue::to_text).collect(),
        None => vec![value.to_text()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_str(json: &str) -> Vec<Provider> {
        let doc = DocumentValue::parse(json).unwrap();
        extract(&doc, &mut IdAllocator::new())
    }

    #[test]
    fn test_precondition_requires_parameters() {
        let providers = extract_str(
            r#"{"definition": {"targetGoals": [{"preconditions": [
                {"type": "A", "parameters": {"x": "1"}},
                {"type": "B"},
                {"parameters": {"y": "2"}}
            ]}]}}"#,
        );
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].provider_type, "A");
        assert_eq!(providers[0].role, ProviderRole::Precondition);
    }

    #[test]
    fn test_filters_follow_owning_action() {
        let providers = extract_str(
            r#"{"definition": {"targetGoals": [{"actions": [
                {"type": "Act1", "parameters": {"a": "1", "environmentQuery": {"definition": {"filters": [
                    {"type": "F1", "parameters": {"f": "x"}},
                    {"type": "F2", "parameters": {}}
                ]}}}},
                {"type": "Act2", "parameters": {"b": 2}}
            ]}]}}"#,
        );
        let types: Vec<_> = providers.iter().map(|p| p.provider_type.as_str()).collect();
        assert_eq!(types, vec!["Act1", "F1", "F2", "Act2"]);
        assert!(!providers[0].parameters.contains_key("environmentQuery"));
        assert_eq!(providers[1].role, ProviderRole::Filter);
        assert_eq!(providers[3].parameters["b"], "2");
    }

    #[test]
    fn test_control_goal_after_target_goal() {
        let providers = extract_str(
            r#"{"definition": {
                "controlGoals": [{"preconditions": [{"type": "C", "parameters": {}}]}],
                "targetGoals": [{"actions": [{"type": "T", "parameters": {}}]}]
            }}"#,
        );
        let summary: Vec<_> = providers
            .iter()
            .map(|p| (p.provider_type.as_str(), p.goal))
            .collect();
        assert_eq!(summary, vec![("T", GoalKind::Target), ("C", GoalKind::Control)]);
    }

    #[test]
    fn test_loop_fields_copied() {
        let providers = extract_str(
            r#"{"definition": {"targetGoals": [{"actions": [
                {"type": "Probation.Providers.LoopAction", "parameters": {},
                 "loopCount": 2, "loopParameters": {"node": ["n1", "n2"]}}
            ]}]}}"#,
        );
        assert_eq!(providers[0].loop_count, Some(2));
        assert_eq!(
            providers[0].loop_parameters.as_ref().unwrap()["node"],
            vec!["n1".to_string(), "n2".to_string()]
        );
    }

    #[test]
    fn test_slots_and_owners_recorded() {
        let providers = extract_str(
            r#"{"definition": {
                "targetGoals": [{
                    "preconditions": [{"type": "P"}, {"type": "P", "parameters": {}}],
                    "actions": [
                        {"name": "untyped", "parameters": {"environmentQuery": {"definition": {"filters": [{"type": "F"}]}}}},
                        {"type": "A", "parameters": {"environmentQuery": {"definition": {"filters": [{"type": "F"}]}}}}
                    ]
                }],
                "controlGoals": [{"preconditions": [{"type": "P", "parameters": {}}]}]
            }}"#,
        );
        let summary: Vec<_> = providers
            .iter()
            .map(|p| (p.provider_type.as_str(), p.slot))
            .collect();
        assert_eq!(
            summary,
            vec![("P", Some(0)), ("A", Some(0)), ("F", Some(0)), ("P", Some(1))]
        );
        assert_eq!(providers[2].owner.as_ref(), Some(&providers[1].id));
        assert!(providers[0].owner.is_none());
    }

    #[test]
    fn test_malformed_sections_yield_nothing() {
        assert!(extract_str(r#"{"definition": {"targetGoals": {}}}"#).is_empty());
        assert!(extract_str(r#"{"definition": {"targetGoals": []}}"#).is_empty());
        assert!(extract_str(r#"[]"#).is_empty());
    }
}
