//! Integration tests for the editor crate

use probation_editor::{
    classify, ChangeKind, DocumentValue, Edit, EditSession, GoalKind, ParameterMap, ProviderId, ProviderRole,
    NODE_STATE_FILTER,
};

const TEMPLATE: &str = include_str!("fixtures/crc_template.json");

fn loaded() -> EditSession {
    let mut session = EditSession::new();
    let count = session.load_template(TEMPLATE).unwrap();
    assert_eq!(count, 8);
    session
}

fn set(session: &mut EditSession, id: &str, key: &str, value: &str) {
    session
        .apply(&Edit::SetParameter {
            provider_id: ProviderId::from(id),
            key: key.to_string(),
            value: value.to_string(),
        })
        .unwrap();
}

fn keys_at<'a>(doc: &'a DocumentValue, path: &[&str]) -> Vec<&'a str> {
    doc.pointer(path)
        .and_then(DocumentValue::as_object)
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn text_at(doc: &DocumentValue, path: &[&str]) -> Option<String> {
    doc.pointer(path).map(DocumentValue::to_text)
}

#[test]
fn test_extraction_order() {
    let session = loaded();
    let summary: Vec<_> = session
        .providers()
        .iter()
        .map(|p| (p.id.as_str(), p.provider_type.rsplit('.').next().unwrap(), p.role))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("provider-0", "NodeStateFilter", ProviderRole::Precondition),
            ("provider-1", "RegionFilter", ProviderRole::Precondition),
            ("provider-2", "RegionFilter", ProviderRole::Precondition),
            ("provider-3", "CrcExperimentAction", ProviderRole::Action),
            ("provider-4", "SkuFilter", ProviderRole::Filter),
            ("provider-5", "RackFilter", ProviderRole::Filter),
            ("provider-6", "LoopAction", ProviderRole::Action),
            ("provider-7", "NodeStateFilter", ProviderRole::Precondition),
        ]
    );
    assert_eq!(session.providers()[7].goal, GoalKind::Control);
}

#[test]
fn test_unedited_merge_is_identity() {
    let session = loaded();
    let original = DocumentValue::parse(TEMPLATE).unwrap();
    let merged = session.merged_document();

    assert_eq!(merged, original);
    assert_eq!(merged.to_json_pretty(), TEMPLATE.trim_end());
    assert!(classify(&original, &merged).is_empty());
}

#[test]
fn test_merge_is_idempotent() {
    let mut session = loaded();
    set(&mut session, "provider-0", "minHours", "48");
    assert_eq!(session.merged_document(), session.merged_document());
}

#[test]
fn test_edit_keeps_key_order() {
    let mut session = loaded();
    set(&mut session, "provider-0", "added", "yes");
    set(&mut session, "provider-0", "state", "Burnin");
    set(&mut session, "provider-0", "another", "1");

    let merged = session.merged_document();
    let path = ["definition", "targetGoals", "0", "preconditions", "0", "parameters"];
    assert_eq!(keys_at(&merged, &path), vec!["state", "minHours", "added", "another"]);
    assert_eq!(text_at(&merged, &["definition", "targetGoals", "0", "preconditions", "0", "parameters", "state"]).as_deref(), Some("Burnin"));
}

#[test]
fn test_repeated_types_fill_slots_in_document_order() {
    let mut session = loaded();
    set(&mut session, "provider-1", "region", "a");
    set(&mut session, "provider-2", "region", "b");

    let merged = session.merged_document();
    let region = |i: &str| {
        text_at(&merged, &["definition", "targetGoals", "0", "preconditions", i, "parameters", "region"])
    };
    assert_eq!(region("1").as_deref(), Some("a"));
    assert_eq!(region("2").as_deref(), Some("b"));
}

#[test]
fn test_removed_provider_drops_its_slot() {
    let mut session = loaded();
    session
        .apply(&Edit::RemoveProvider {
            provider_id: ProviderId::from("provider-1"),
        })
        .unwrap();
    set(&mut session, "provider-2", "region", "northeurope");

    let submission = session.submission();
    assert_eq!(submission.filter_providers.len(), 7);

    let preconditions = submission
        .full_payload
        .pointer(&["definition", "targetGoals", "0", "preconditions"])
        .and_then(DocumentValue::as_array)
        .unwrap();
    assert_eq!(preconditions.len(), 2);
    assert_eq!(text_at(&preconditions[1], &["parameters", "region"]).as_deref(), Some("northeurope"));

    // later roles and goals keep their own parameter sets
    assert_eq!(
        text_at(&submission.full_payload, &["definition", "controlGoals", "0", "preconditions", "0", "parameters", "state"]).as_deref(),
        Some("Production")
    );
}

#[test]
fn test_removed_action_drops_its_filters() {
    let mut session = loaded();
    session
        .apply(&Edit::RemoveProvider {
            provider_id: ProviderId::from("provider-3"),
        })
        .unwrap();

    let ids: Vec<_> = session.providers().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["provider-0", "provider-1", "provider-2", "provider-6", "provider-7"]);

    let merged = session.merged_document();
    let actions = merged
        .pointer(&["definition", "targetGoals", "0", "actions"])
        .and_then(DocumentValue::as_array)
        .unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(text_at(&actions[0], &["type"]).as_deref(), Some("Probation.Providers.LoopAction"));
}

#[test]
fn test_removed_filter_leaves_siblings() {
    let mut session = loaded();
    session
        .apply(&Edit::RemoveProvider {
            provider_id: ProviderId::from("provider-4"),
        })
        .unwrap();

    let merged = session.merged_document();
    let filters = ["definition", "targetGoals", "0", "actions", "0", "parameters", "environmentQuery", "definition", "filters"];
    let filters = merged.pointer(&filters).and_then(DocumentValue::as_array).unwrap();
    assert_eq!(filters.len(), 1);
    assert_eq!(text_at(&filters[0], &["parameters", "rack"]).as_deref(), Some("r1"));
}

#[test]
fn test_parameterless_precondition_round_trips() {
    let template = r#"{"definition": {"targetGoals": [{"preconditions": [
        {"type": "X"},
        {"type": "X", "parameters": {"a": "1"}}
    ]}]}}"#;
    let mut session = EditSession::new();
    assert_eq!(session.load_template(template).unwrap(), 1);

    let original = DocumentValue::parse(template).unwrap();
    let merged = session.merged_document();
    assert_eq!(merged, original);
    assert!(classify(&original, &merged).is_empty());

    set(&mut session, "provider-0", "a", "2");
    let merged = session.merged_document();
    let preconditions = merged
        .pointer(&["definition", "targetGoals", "0", "preconditions"])
        .and_then(DocumentValue::as_array)
        .unwrap();
    assert_eq!(preconditions[0].to_json(), r#"{"type":"X"}"#);
    assert_eq!(text_at(&preconditions[1], &["parameters", "a"]).as_deref(), Some("2"));
}

#[test]
fn test_filters_of_untyped_action_left_alone() {
    let template = r#"{"definition": {"targetGoals": [{"actions": [
        {"name": "untyped", "parameters": {"environmentQuery": {"definition": {"filters": [
            {"type": "F", "parameters": {"f": "a"}}
        ]}}}},
        {"type": "A", "parameters": {"environmentQuery": {"definition": {"filters": [
            {"type": "F", "parameters": {"f": "b"}}
        ]}}}}
    ]}]}}"#;
    let mut session = EditSession::new();
    assert_eq!(session.load_template(template).unwrap(), 2);

    let original = DocumentValue::parse(template).unwrap();
    let merged = session.merged_document();
    assert_eq!(merged, original);
    assert!(classify(&original, &merged).is_empty());
}

#[test]
fn test_control_goal_gets_its_own_parameters() {
    let mut session = loaded();
    set(&mut session, "provider-7", "state", "Quarantine");

    let merged = session.merged_document();
    assert_eq!(
        text_at(&merged, &["definition", "targetGoals", "0", "preconditions", "0", "parameters", "state"]).as_deref(),
        Some("Probation")
    );
    assert_eq!(
        text_at(&merged, &["definition", "controlGoals", "0", "preconditions", "0", "parameters", "state"]).as_deref(),
        Some("Quarantine")
    );
}

#[test]
fn test_action_edit_keeps_environment_query_and_filters() {
    let mut session = loaded();
    set(&mut session, "provider-3", "sku", "G8-B");
    set(&mut session, "provider-5", "rack", "r9");

    let merged = session.merged_document();
    let params = ["definition", "targetGoals", "0", "actions", "0", "parameters"];
    assert_eq!(keys_at(&merged, &params), vec!["sku", "durationHours", "environmentQuery"]);
    assert_eq!(
        merged.pointer(&["definition", "targetGoals", "0", "actions", "0", "parameters", "durationHours"]),
        Some(&DocumentValue::from(24u64))
    );

    let filters = ["definition", "targetGoals", "0", "actions", "0", "parameters", "environmentQuery", "definition", "filters"];
    let filters = merged.pointer(&filters).and_then(DocumentValue::as_array).unwrap();
    assert_eq!(text_at(&filters[0], &["parameters", "sku"]).as_deref(), Some("G8-A"));
    assert_eq!(text_at(&filters[1], &["parameters", "rack"]).as_deref(), Some("r9"));
    assert_eq!(
        text_at(&merged, &["definition", "targetGoals", "0", "actions", "0", "parameters", "environmentQuery", "limit"]).as_deref(),
        Some("10")
    );
}

#[test]
fn test_loop_edits_written_back() {
    let mut session = loaded();
    let loop_id = ProviderId::from("provider-6");
    session
        .apply(&Edit::SetLoopCount {
            provider_id: loop_id.clone(),
            count: 3,
        })
        .unwrap();
    session
        .apply(&Edit::SetLoopParameter {
            provider_id: loop_id.clone(),
            key: "node".to_string(),
            values: vec!["n1".into(), "n2".into(), "n3".into()],
        })
        .unwrap();
    assert!(session
        .apply(&Edit::SetLoopParameter {
            provider_id: loop_id,
            key: "rack".to_string(),
            values: vec!["r1".into()],
        })
        .is_err());

    let merged = session.merged_document();
    let slot = merged
        .pointer(&["definition", "targetGoals", "0", "actions", "1"])
        .unwrap();
    assert_eq!(slot.to_json(), r#"{"type":"Probation.Providers.LoopAction","parameters":{"action":"reboot"},"loopCount":3,"loopParameters":{"node":["n1","n2","n3"]}}"#);
}

#[test]
fn test_added_parameter_is_classified_new() {
    let template = r#"{"definition": {"targetGoals": [{"preconditions": [
        {"type": "P", "parameters": {"x": "1"}}
    ]}]}}"#;
    let mut session = EditSession::new();
    session.load_template(template).unwrap();
    set(&mut session, "provider-0", "y", "2");

    let preview = session.preview();
    let slot = preview
        .document
        .pointer(&["definition", "targetGoals", "0", "preconditions", "0", "parameters"])
        .unwrap();
    assert_eq!(slot.to_json(), r#"{"x":"1","y":"2"}"#);
    assert_eq!(preview.changes.get("y"), Some(&ChangeKind::New));
    assert_eq!(preview.changes.len(), 1);

    let marked: Vec<_> = preview
        .lines
        .iter()
        .filter(|l| l.change == Some(ChangeKind::New))
        .map(|l| l.text.trim())
        .collect();
    assert_eq!(marked, vec![r#""y": "2""#]);
}

#[test]
fn test_deleted_parameter_never_submitted() {
    let mut session = loaded();
    let id = ProviderId::from("provider-0");
    session
        .apply(&Edit::DeleteParameter {
            provider_id: id.clone(),
            key: "minHours".to_string(),
        })
        .unwrap();

    let submission = session.submission();
    let params = ["definition", "targetGoals", "0", "preconditions", "0", "parameters"];
    assert_eq!(keys_at(&submission.full_payload, &params), vec!["state"]);
    assert!(!submission.filter_providers[0].parameters.contains_key("minHours"));

    // the live form still holds the value
    assert_eq!(session.providers()[0].parameters["minHours"], "24");

    // other slots of the same type are untouched
    let control = ["definition", "controlGoals", "0", "preconditions", "0", "parameters"];
    assert_eq!(keys_at(&submission.full_payload, &control), vec!["state", "minHours"]);

    let preview = session.preview();
    assert_eq!(preview.deleted_keys(), vec!["minHours"]);

    session
        .apply(&Edit::RestoreParameter {
            provider_id: id,
            key: "minHours".to_string(),
        })
        .unwrap();
    assert_eq!(session.merged_document(), DocumentValue::parse(TEMPLATE).unwrap());
}

#[test]
fn test_top_level_fields_overwrite_only_when_set() {
    let mut session = loaded();
    session.set_experiment_name("");
    let merged = session.merged_document();
    assert_eq!(text_at(&merged, &["definition", "experimentName"]).as_deref(), Some("Gen8 CRC burn-in"));

    session.set_experiment_name("Gen9 CRC burn-in");
    session.set_generation("Gen9");
    let preview = session.preview();
    assert_eq!(preview.changes.get("experimentName"), Some(&ChangeKind::Modified));
    assert_eq!(preview.changes.get("generation"), Some(&ChangeKind::Modified));
}

#[test]
fn test_parameter_changes_against_load_time_form() {
    let mut session = loaded();
    set(&mut session, "provider-1", "region", "centralus");
    set(&mut session, "provider-1", "zone", "1");

    let changes: Vec<_> = session
        .parameter_changes()
        .into_iter()
        .map(|c| (c.provider_id.to_string(), c.key))
        .collect();
    assert_eq!(
        changes,
        vec![
            ("provider-1".to_string(), "region".to_string()),
            ("provider-1".to_string(), "zone".to_string()),
        ]
    );
}

#[test]
fn test_no_template_synthesizes_default_document() {
    let mut session = EditSession::new();
    let parameters: ParameterMap = [("state".to_string(), "Burnin".to_string())].into_iter().collect();
    session
        .apply(&Edit::AddProvider {
            provider_type: NODE_STATE_FILTER.to_string(),
            role: ProviderRole::Precondition,
            goal: GoalKind::Target,
            parameters,
        })
        .unwrap();

    let doc = session.merged_document();
    assert!(text_at(&doc, &["definition", "experimentName"]).is_some());
    assert!(text_at(&doc, &["definition", "metadata", "generation"]).is_some());
    assert!(doc.pointer(&["definition", "targetGoals", "0"]).is_some());

    let slot = doc
        .pointer(&["definition", "targetGoals", "0", "preconditions", "1"])
        .unwrap();
    assert_eq!(slot.to_json(), r#"{"type":"Probation.Providers.NodeStateFilter","parameters":{"state":"Burnin"}}"#);

    let submission = session.submission();
    assert_eq!(submission.experiment_name, "Custom CRC Experiment");
    assert_eq!(submission.generation, "Gen8");
}
