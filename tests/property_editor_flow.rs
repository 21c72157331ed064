use linstor_prop_editor::logic::{EditorPhase, PropertyEditor, SchemaResolver, SubmitOutcome};
use linstor_prop_editor::model::{
    property_map, FieldPathConstants, ObjectRef, ObjectTypeCatalog, PropertyDefinition,
    PropertyKind, PropertyMap, PropertySchema, SubmissionPayload, UiKind,
};
use linstor_prop_editor::seed::default_catalog;
use linstor_prop_editor::store::{MemoryPropertyStore, PropertySource};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

fn string_field_catalog() -> ObjectTypeCatalog {
    let mut general = PropertySchema::default();
    general
        .define(
            "stringField",
            PropertyDefinition::new("stringField", PropertyKind::String).with_info("i"),
        )
        .attach("node", ["stringField"]);
    ObjectTypeCatalog::new(general, PropertySchema::default())
}

fn strings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn delivered(outcome: SubmitOutcome) -> SubmissionPayload {
    match outcome {
        SubmitOutcome::Delivered(submission) => submission.payload,
        other => panic!("expected a delivered submission, got {:?}", other),
    }
}

#[test]
fn test_string_field_shown_and_hidden() {
    let catalog = string_field_catalog();
    let constants = FieldPathConstants::default();
    let resolver = SchemaResolver::new(&catalog, &constants);

    let shown = resolver.resolve("node", &property_map([("stringField", "v")]));
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].name, "stringField");
    assert_eq!(shown[0].ui_kind, UiKind::Text);
    assert_eq!(shown[0].default_value, json!("v"));
    assert!(!shown[0].hidden);

    let hidden = resolver.resolve("node", &PropertyMap::new());
    assert_eq!(hidden[0].default_value, json!(""));
    assert!(hidden[0].hidden);
}

#[tokio::test]
async fn test_single_auxiliary_row_submission() {
    let catalog = string_field_catalog();
    let constants = FieldPathConstants::default();
    let store = MemoryPropertyStore::new();
    let target = ObjectRef::new("node", "alpha");
    store.insert(target.clone(), Vec::<(String, String)>::new());

    let mut editor = PropertyEditor::new(SchemaResolver::new(&catalog, &constants));
    editor.open_from(&store, target.clone()).await.unwrap();

    let row = editor.add_auxiliary().unwrap();
    editor.change_auxiliary(row, "foo", "bar").unwrap();

    let payload = delivered(editor.submit(&store).await.unwrap());
    assert_eq!(payload.override_props, strings(&[("Aux/foo", "bar")]));
    assert!(payload.delete_props.is_empty());
    assert_eq!(editor.phase(), EditorPhase::Closed);

    let stored = store.get_properties(&target).await.unwrap();
    assert_eq!(stored.get("Aux/foo"), Some(&json!("bar")));
}

#[tokio::test]
async fn test_empty_auxiliary_row_is_skipped() {
    let catalog = string_field_catalog();
    let constants = FieldPathConstants::default();
    let store = MemoryPropertyStore::new();
    let target = ObjectRef::new("node", "alpha");

    let mut editor = PropertyEditor::new(SchemaResolver::new(&catalog, &constants));
    editor.open(target, PropertyMap::new());

    let first = editor.add_auxiliary().unwrap();
    editor.add_auxiliary().unwrap();
    editor.change_auxiliary(first, "validProp", "validValue").unwrap();

    let payload = delivered(editor.submit(&store).await.unwrap());
    assert_eq!(payload.override_props, strings(&[("Aux/validProp", "validValue")]));
}

#[tokio::test]
async fn test_full_node_edit_against_seed_catalog() {
    let (catalog, constants) = default_catalog();
    let store = MemoryPropertyStore::new();
    let target = ObjectRef::new("node", "alpha");
    store.insert(
        target.clone(),
        [
            ("PrefNic", "eth0"),
            ("AutoplaceTarget", "true"),
            ("DrbdOptions/Net/max-buffers", "4096"),
            ("Aux/site", "berlin"),
            ("Aux/rack", "12"),
        ],
    );

    let mut editor = PropertyEditor::new(SchemaResolver::new(&catalog, &constants));
    editor.open_from(&store, target.clone()).await.unwrap();

    let shown: BTreeSet<String> = editor
        .shown_fields()
        .unwrap()
        .iter()
        .map(|f| f.name.clone())
        .collect();
    let expected: BTreeSet<String> = ["PrefNic", "AutoplaceTarget", "DrbdOptions/Net/max-buffers"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(shown, expected);
    assert_eq!(editor.form().unwrap().value("AutoplaceTarget"), Some(&json!(true)));

    editor.set_value("AutoplaceTarget", json!(false)).unwrap();
    editor.remove_property("DrbdOptions/Net/max-buffers").unwrap();
    editor.add_property("DrbdOptions/Net/protocol").unwrap();
    editor.set_value("DrbdOptions/Net/protocol", json!("C")).unwrap();

    let rack = editor
        .auxiliary()
        .unwrap()
        .iter()
        .find(|row| row.name == "rack")
        .map(|row| row.id)
        .unwrap();
    editor.remove_auxiliary(rack).unwrap();

    let payload = delivered(editor.submit(&store).await.unwrap());
    assert_eq!(
        payload.override_props,
        strings(&[
            ("AutoplaceTarget", "false"),
            ("Aux/site", "berlin"),
            ("DrbdOptions/Net/protocol", "C"),
            ("PrefNic", "eth0"),
        ])
    );
    assert_eq!(
        payload.delete_props,
        vec!["DrbdOptions/Net/max-buffers".to_string(), "Aux/rack".to_string()]
    );

    let stored = store.get_properties(&target).await.unwrap();
    let keys: Vec<&str> = stored.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["AutoplaceTarget", "Aux/site", "DrbdOptions/Net/protocol", "PrefNic"]
    );
}

#[tokio::test]
async fn test_delete_all_removes_every_original_key() {
    let (catalog, constants) = default_catalog();
    let store = MemoryPropertyStore::new();
    let target = ObjectRef::new("resource-definition", "pvc-1");
    store.insert(
        target.clone(),
        [
            ("DrbdOptions/Resource/quorum", "majority"),
            ("Aux/owner", "k8s"),
            ("Internal/Unlisted", "x"),
        ],
    );

    let mut editor = PropertyEditor::new(SchemaResolver::new(&catalog, &constants));
    editor.open_from(&store, target.clone()).await.unwrap();
    editor.remove_property("DrbdOptions/Resource/quorum").unwrap();
    editor.delete_all().unwrap();

    let payload = delivered(editor.submit(&store).await.unwrap());
    let deleted: BTreeSet<&str> = payload.delete_props.iter().map(String::as_str).collect();
    assert_eq!(
        deleted,
        ["DrbdOptions/Resource/quorum", "Aux/owner", "Internal/Unlisted"]
            .into_iter()
            .collect::<BTreeSet<&str>>()
    );
    assert!(store.get_properties(&target).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_auxiliary_name_reused_after_removal_is_stored() {
    let catalog = string_field_catalog();
    let constants = FieldPathConstants::default();
    let store = MemoryPropertyStore::new();
    let target = ObjectRef::new("node", "alpha");
    store.insert(target.clone(), [("Aux/site", "berlin"), ("Aux/rack", "12")]);

    let mut editor = PropertyEditor::new(SchemaResolver::new(&catalog, &constants));
    editor.open_from(&store, target.clone()).await.unwrap();
    let rows: BTreeMap<String, u64> = editor
        .auxiliary()
        .unwrap()
        .iter()
        .map(|row| (row.name.clone(), row.id))
        .collect();

    editor.remove_auxiliary(rows["site"]).unwrap();
    let row = editor.add_auxiliary().unwrap();
    editor.change_auxiliary(row, "site", "paris").unwrap();
    editor.change_auxiliary(rows["rack"], "shelf", "12").unwrap();

    let payload = delivered(editor.submit(&store).await.unwrap());
    assert_eq!(payload.delete_props, vec!["Aux/rack".to_string()]);

    let stored = store.get_properties(&target).await.unwrap();
    assert_eq!(stored, property_map([("Aux/shelf", "12"), ("Aux/site", "paris")]));
}

#[tokio::test]
async fn test_failed_store_write_still_closes_editor() {
    let catalog = string_field_catalog();
    let constants = FieldPathConstants::default();
    let store = MemoryPropertyStore::new();
    store.set_read_only(true);

    let mut editor = PropertyEditor::new(SchemaResolver::new(&catalog, &constants));
    editor.open(ObjectRef::new("node", "alpha"), property_map([("stringField", "v")]));

    match editor.submit(&store).await.unwrap() {
        SubmitOutcome::Failed { submission, reason } => {
            assert_eq!(submission.payload.override_props, strings(&[("stringField", "v")]));
            assert!(reason.contains("read-only"));
        }
        other => panic!("expected a failed submission, got {:?}", other),
    }
    assert_eq!(editor.phase(), EditorPhase::Closed);
}

#[tokio::test]
async fn test_invalid_submission_keeps_editor_open() {
    let (catalog, constants) = default_catalog();
    let store = MemoryPropertyStore::new();

    let mut editor = PropertyEditor::new(SchemaResolver::new(&catalog, &constants));
    editor.open(
        ObjectRef::new("controller", ""),
        property_map([("TcpPortAutoRange", "7000-7999")]),
    );
    editor.set_value("TcpPortAutoRange", json!("7000")).unwrap();

    match editor.submit(&store).await.unwrap() {
        SubmitOutcome::Invalid(result) => {
            let error = result.error_for("TcpPortAutoRange").unwrap();
            assert_eq!(error.message, "Expected a port range such as 7000-7999");
        }
        other => panic!("expected an invalid submission, got {:?}", other),
    }
    assert_eq!(editor.phase(), EditorPhase::Open);
    assert!(store.history().is_empty());
}
