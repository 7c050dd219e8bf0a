use structure_models::{CompleteStructure, ElementType, ThingNode};

fn element_type(external_id: &str) -> ElementType {
    ElementType {
        external_id: external_id.to_string(),
        stakeholder_key: "acme".to_string(),
        name: format!("type-{external_id}"),
        description: None,
        id: None,
    }
}

fn node(external_id: &str, parent: Option<&str>, stakeholder: &str) -> ThingNode {
    ThingNode {
        external_id: external_id.to_string(),
        stakeholder_key: stakeholder.to_string(),
        name: format!("node-{external_id}"),
        description: None,
        meta_data: None,
        parent_external_node_id: parent.map(|s| s.to_string()),
        parent_node_id: None,
        element_type_external_id: "et1".to_string(),
        element_type_id: None,
        id: None,
    }
}

fn minimal_valid() -> CompleteStructure {
    CompleteStructure {
        element_types: vec![element_type("et1")],
        thing_nodes: vec![node("root", None, "acme")],
        sources: vec![],
        sinks: vec![],
    }
}

#[test]
fn accepts_minimal_valid_document() {
    assert!(minimal_valid().validate().is_ok());
}

#[test]
fn rejects_empty_element_types() {
    let mut cs = minimal_valid();
    cs.element_types.clear();
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("element_types must not be empty"));
}

#[test]
fn rejects_empty_external_id() {
    let mut cs = minimal_valid();
    cs.thing_nodes[0].external_id = String::new();
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("empty external_id"));
}

#[test]
fn rejects_duplicate_external_identity() {
    let mut cs = minimal_valid();
    let mut dup = node("root2", None, "acme");
    dup.external_id = "root".to_string();
    cs.thing_nodes.push(dup);
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("duplicate (stakeholder_key, external_id) pair"));
}

#[test]
fn rejects_circular_parent_reference() {
    let mut cs = minimal_valid();
    cs.thing_nodes = vec![
        node("x", Some("y"), "acme"),
        node("y", Some("x"), "acme"),
    ];
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("Circular reference detected"));
}

#[test]
fn rejects_non_homogeneous_stakeholder() {
    let mut cs = minimal_valid();
    cs.thing_nodes = vec![
        node("root", None, "acme"),
        node("child", Some("root"), "other-stakeholder"),
    ];
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("stakeholder_key"));
}

#[test]
fn rejects_root_with_unresolved_parent() {
    let mut cs = minimal_valid();
    cs.thing_nodes = vec![node("root", Some("missing"), "acme")];
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("does not resolve"));
}

#[test]
fn rejects_source_referencing_nonexistent_thing_node() {
    let mut cs = minimal_valid();
    cs.sources.push(structure_models::Source {
        external_id: "src1".to_string(),
        stakeholder_key: "acme".to_string(),
        name: "Energy usage".to_string(),
        display_path: "/energy".to_string(),
        type_: structure_models::WireType::TimeseriesFloat,
        visible: true,
        adapter_key: "sql-adapter".to_string(),
        source_id: "sql_src_1".to_string(),
        ref_key: None,
        ref_id: None,
        preset_filters: Default::default(),
        passthrough_filters: vec![],
        meta_data: None,
        thing_node_external_ids: vec!["does-not-exist".to_string()],
        id: None,
    });
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("does not exist as a thing_node"));
}

#[test]
fn rejects_duplicate_thing_node_ref_on_source() {
    let mut cs = minimal_valid();
    cs.sources.push(structure_models::Source {
        external_id: "src1".to_string(),
        stakeholder_key: "acme".to_string(),
        name: "Energy usage".to_string(),
        display_path: "/energy".to_string(),
        type_: structure_models::WireType::TimeseriesFloat,
        visible: true,
        adapter_key: "sql-adapter".to_string(),
        source_id: "sql_src_1".to_string(),
        ref_key: None,
        ref_id: None,
        preset_filters: Default::default(),
        passthrough_filters: vec![],
        meta_data: None,
        thing_node_external_ids: vec!["root".to_string(), "root".to_string()],
        id: None,
    });
    let err = cs.validate().unwrap_err();
    assert!(err.0.contains("more than once"));
}

#[test]
fn deserializes_from_json_document() {
    let raw = r#"{
        "element_types": [{"external_id": "et1", "stakeholder_key": "acme", "name": "Waterworks"}],
        "thing_nodes": [{"external_id": "root", "stakeholder_key": "acme", "name": "Waterworks 1", "element_type_external_id": "et1"}],
        "sources": [],
        "sinks": []
    }"#;
    let cs = CompleteStructure::from_json(raw).unwrap();
    assert!(cs.validate().is_ok());
    assert_eq!(cs.thing_nodes[0].name, "Waterworks 1");
}
