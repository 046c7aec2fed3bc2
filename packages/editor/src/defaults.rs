//! # Default Document Synthesis
//!
//! Builds a complete experiment definition when no template was uploaded.
//!
//! The document follows a fixed schema whose provider slots carry default
//! parameters. An edited provider of the same role and type replaces a
//! default slot's parameters; providers whose type has no default slot are
//! appended to the goal they belong to (filters go to the first target
//! action's environment query).

use crate::edit_store::ParameterEditStore;
use crate::merge::{write_loop, ParameterPool, ParameterSet};
use crate::provider::{GoalKind, ProviderRole};
use crate::template::{self, TopLevelFields, ACTIONS, PARAMETERS, PRECONDITIONS, TYPE};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use probation_document::{DocumentMap, DocumentValue};
use serde_json::json;

pub const NODE_GENERATION_FILTER: &str = "Probation.Providers.NodeGenerationFilter";
pub const NODE_STATE_FILTER: &str = "Probation.Providers.NodeStateFilter";
pub const CRC_EXPERIMENT_ACTION: &str = "Probation.Providers.CrcExperimentAction";
pub const SKU_FILTER: &str = "Probation.Providers.SkuFilter";

const OWNER: &str = "probation-dashboard";
const TEAM: &str = "Fleet Health";
const EXPERIMENT_DURATION_DAYS: i64 = 7;

/// Fallback values for blank top-level fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisDefaults {
    pub experiment_name: String,
    pub generation: String,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            experiment_name: "Custom CRC Experiment".to_string(),
            generation: "Gen8".to_string(),
        }
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Synthesize the default document with the live edits substituted in
pub fn synthesize(
    store: &ParameterEditStore,
    top: &TopLevelFields,
    defaults: &SynthesisDefaults,
    now: DateTime<Utc>,
) -> DocumentValue {
    let experiment_name = or_default(&top.experiment_name, &defaults.experiment_name);
    let generation = or_default(&top.generation, &defaults.generation);
    let target_sku = format!("{}-TARGET-SKU", generation);
    let control_sku = format!("{}-CONTROL-SKU", generation);
    let timestamp = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);

    let skeleton = json!({
        "definition": {
            "experimentName": experiment_name,
            "owner": OWNER,
            "team": TEAM,
            "metadata": {
                "generation": generation,
                "targetSku": target_sku,
                "controlSku": control_sku,
                "createdAt": timestamp(now),
            },
            "schedule": {
                "startTime": timestamp(now),
                "endTime": timestamp(now + Duration::days(EXPERIMENT_DURATION_DAYS)),
                "recurrence": "None",
            },
            "targetGoals": [{
                "name": "TargetGoal",
                "preconditions": [
                    { "type": NODE_GENERATION_FILTER, "parameters": { "generation": generation } },
                    { "type": NODE_STATE_FILTER, "parameters": { "state": "Probation" } },
                ],
                "actions": [{
                    "type": CRC_EXPERIMENT_ACTION,
                    "parameters": {
                        "sku": target_sku,
                        "durationHours": "24",
                        "environmentQuery": {
                            "definition": {
                                "filters": [
                                    { "type": SKU_FILTER, "parameters": { "sku": target_sku } },
                                ],
                            },
                        },
                    },
                }],
            }],
            "controlGoals": [{
                "name": "ControlGoal",
                "preconditions": [
                    { "type": NODE_GENERATION_FILTER, "parameters": { "generation": generation } },
                    { "type": NODE_STATE_FILTER, "parameters": { "state": "Production" } },
                ],
                "actions": [],
            }],
        }
    });
    let mut doc = DocumentValue::from(skeleton);

    let mut preconditions = ParameterPool::for_role(store, ProviderRole::Precondition);
    let mut actions = ParameterPool::for_role(store, ProviderRole::Action);
    let mut filters = ParameterPool::for_role(store, ProviderRole::Filter);

    for goal in template::GOALS {
        if let Some(slots) = template::slot_list_mut(&mut doc, goal, PRECONDITIONS) {
            slots.iter_mut().for_each(|slot| substitute_slot(slot, &mut preconditions));
        }
        if let Some(slots) = template::slot_list_mut(&mut doc, goal, ACTIONS) {
            for slot in slots.iter_mut() {
                substitute_slot(slot, &mut actions);
                if let Some(nested) = template::action_filters_mut(slot) {
                    nested.iter_mut().for_each(|filter| substitute_slot(filter, &mut filters));
                }
            }
        }
    }

    append_unmatched(&mut doc, &preconditions, PRECONDITIONS);
    append_unmatched(&mut doc, &actions, ACTIONS);
    if let Some(nested) = template::slot_list_mut(&mut doc, GoalKind::Target, ACTIONS)
        .and_then(|actions| actions.first_mut())
        .and_then(template::action_filters_mut)
    {
        nested.extend(filters.unconsumed().map(slot_from));
    }

    doc
}

/// Replace a default slot's parameters with the next edited set of its type
fn substitute_slot(slot: &mut DocumentValue, pool: &mut ParameterPool<'_>) {
    let Some(provider_type) = slot.get(TYPE).and_then(DocumentValue::as_str).map(str::to_string) else {
        return;
    };
    let Some(set) = pool.next(&provider_type) else {
        return;
    };
    let Some(fields) = slot.as_object_mut() else {
        return;
    };

    // the nested environment query is structural, not an operator parameter
    let structural = fields
        .get(PARAMETERS)
        .and_then(|p| p.get(template::ENVIRONMENT_QUERY))
        .cloned();

    let mut parameters = parameters_of(set);
    if let Some(query) = structural {
        parameters.insert(template::ENVIRONMENT_QUERY.to_string(), query);
    }
    fields.insert(PARAMETERS.to_string(), DocumentValue::Object(parameters));
    write_loop(fields, set.provider);
}

fn append_unmatched(doc: &mut DocumentValue, pool: &ParameterPool<'_>, list: &str) {
    for set in pool.unconsumed() {
        if let Some(slots) = template::slot_list_mut(doc, set.provider.goal, list) {
            slots.push(slot_from(set));
        }
    }
}

fn parameters_of(set: &ParameterSet<'_>) -> DocumentMap {
    set.parameters
        .iter()
        .map(|(k, v)| (k.clone(), DocumentValue::String(v.clone())))
        .collect()
}

fn slot_from(set: &ParameterSet<'_>) -> DocumentValue {
    let mut fields = DocumentMap::new();
    fields.insert(TYPE.to_string(), DocumentValue::String(set.provider.provider_type.clone()));
    fields.insert(PARAMETERS.to_string(), DocumentValue::Object(parameters_of(set)));
    write_loop(&mut fields, set.provider);
    DocumentValue::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ParameterMap;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_blank_fields_use_defaults() {
        let store = ParameterEditStore::new();
        let doc = synthesize(&store, &TopLevelFields::default(), &SynthesisDefaults::default(), now());

        assert_eq!(
            doc.pointer(&["definition", "experimentName"]).and_then(|v| v.as_str()),
            Some("Custom CRC Experiment")
        );
        assert_eq!(
            doc.pointer(&["definition", "metadata", "targetSku"]).and_then(|v| v.as_str()),
            Some("Gen8-TARGET-SKU")
        );
        assert_eq!(
            doc.pointer(&["definition", "schedule", "endTime"]).and_then(|v| v.as_str()),
            Some("2026-01-09T03:04:05Z")
        );
    }

    #[test]
    fn test_unknown_types_are_appended() {
        let mut store = ParameterEditStore::new();
        let params: ParameterMap = [("x".to_string(), "1".to_string())].into_iter().collect();
        store.add_provider("Custom.Check", ProviderRole::Precondition, GoalKind::Control, params.clone());
        store.add_provider("Custom.Filter", ProviderRole::Filter, GoalKind::Target, params);

        let doc = synthesize(&store, &TopLevelFields::default(), &SynthesisDefaults::default(), now());
        let control = doc
            .pointer(&["definition", "controlGoals", "0", "preconditions"])
            .and_then(|v| v.as_array())
            .unwrap();
        assert_eq!(control.len(), 3);
        assert_eq!(control[2].get("type").and_then(|t| t.as_str()), Some("Custom.Check"));

        let filters = doc
            .pointer(&[
                "definition", "targetGoals", "0", "actions", "0", "parameters",
                "environmentQuery", "definition", "filters",
            ])
            .and_then(|v| v.as_array())
            .unwrap();
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn test_action_substitution_keeps_environment_query() {
        let mut store = ParameterEditStore::new();
        let params: ParameterMap = [("sku".to_string(), "custom".to_string())].into_iter().collect();
        store.add_provider(CRC_EXPERIMENT_ACTION, ProviderRole::Action, GoalKind::Target, params);

        let doc = synthesize(&store, &TopLevelFields::default(), &SynthesisDefaults::default(), now());
        let parameters = doc
            .pointer(&["definition", "targetGoals", "0", "actions", "0", "parameters"])
            .and_then(|v| v.as_object())
            .unwrap();
        let keys: Vec<_> = parameters.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["sku", "environmentQuery"]);
    }
}
