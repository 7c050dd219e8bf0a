use structure_db::{Db, DbPool};
use structure_models::{ElementType, Sink, Source, ThingNode};

async fn temp_db() -> (Db, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("structure.sqlite");
    let pool = DbPool::connect_sqlite(path.to_str().unwrap())
        .await
        .expect("connect sqlite");
    (Db::new(pool), dir)
}

fn element_type(external_id: &str) -> ElementType {
    ElementType {
        external_id: external_id.to_string(),
        stakeholder_key: "acme".to_string(),
        name: format!("{external_id}-name"),
        description: None,
        id: None,
    }
}

fn root_node(external_id: &str, element_type_external_id: &str) -> ThingNode {
    ThingNode {
        external_id: external_id.to_string(),
        stakeholder_key: "acme".to_string(),
        name: format!("{external_id}-name"),
        description: None,
        meta_data: None,
        parent_external_node_id: None,
        parent_node_id: None,
        element_type_external_id: element_type_external_id.to_string(),
        element_type_id: None,
        id: None,
    }
}

fn child_node(external_id: &str, parent_external_id: &str, element_type_external_id: &str) -> ThingNode {
    ThingNode {
        parent_external_node_id: Some(parent_external_id.to_string()),
        ..root_node(external_id, element_type_external_id)
    }
}

#[tokio::test]
async fn upserts_and_reads_back_a_hierarchy() {
    let (db, _dir) = temp_db().await;

    let structure = structure_models::CompleteStructure {
        element_types: vec![element_type("et-1")],
        thing_nodes: vec![
            root_node("root", "et-1"),
            child_node("child", "root", "et-1"),
        ],
        sources: vec![],
        sinks: vec![],
    };

    db.upsert_structure(&structure).await.expect("upsert succeeds");

    assert!(!db.is_empty().await.expect("is_empty"));

    let ordered = db.hierarchy().await.expect("hierarchy");
    assert_eq!(ordered.len(), 2);
    assert_eq!(ordered[0].external_id, "root");
    assert_eq!(ordered[1].external_id, "child");
    assert_eq!(ordered[1].parent_node_id, ordered[0].id);
}

#[tokio::test]
async fn upsert_is_idempotent_and_preserves_ids() {
    let (db, _dir) = temp_db().await;

    let structure = structure_models::CompleteStructure {
        element_types: vec![element_type("et-1")],
        thing_nodes: vec![root_node("root", "et-1")],
        sources: vec![],
        sinks: vec![],
    };

    db.upsert_structure(&structure).await.expect("first upsert");
    let first = db.hierarchy().await.expect("hierarchy");
    let first_id = first[0].id;

    db.upsert_structure(&structure).await.expect("second upsert");
    let second = db.hierarchy().await.expect("hierarchy");

    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, first_id);
}

#[tokio::test]
async fn upserts_sources_and_sinks_with_associations() {
    let (db, _dir) = temp_db().await;

    let mut source = sample_source("src-1");
    source.thing_node_external_ids = vec!["root".to_string()];
    let mut sink = sample_sink("sink-1");
    sink.thing_node_external_ids = vec!["root".to_string()];

    let structure = structure_models::CompleteStructure {
        element_types: vec![element_type("et-1")],
        thing_nodes: vec![root_node("root", "et-1")],
        sources: vec![source],
        sinks: vec![sink],
    };

    db.upsert_structure(&structure).await.expect("upsert succeeds");

    let found = db.search_sources("src").await.expect("search_sources");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].thing_node_external_ids, vec!["root".to_string()]);

    let found_sinks = db.search_sinks("sink").await.expect("search_sinks");
    assert_eq!(found_sinks.len(), 1);
}

#[tokio::test]
async fn upserts_and_reads_back_json_bearing_fields() {
    let (db, _dir) = temp_db().await;

    let mut node = root_node("root", "et-1");
    node.meta_data = Some(serde_json::json!({"unit": "m3/h"}));

    let mut source = sample_source("src-1");
    source.thing_node_external_ids = vec!["root".to_string()];
    source.meta_data = Some(serde_json::json!({"key": "value"}));
    source.preset_filters = [("from".to_string(), serde_json::json!("2020-01-01"))]
        .into_iter()
        .collect();
    source.passthrough_filters = vec![structure_models::Filter {
        name: "timestampFrom".to_string(),
        internal_name: None,
        type_: structure_models::FilterType::FreeText,
        required: false,
    }];

    let structure = structure_models::CompleteStructure {
        element_types: vec![element_type("et-1")],
        thing_nodes: vec![node],
        sources: vec![source],
        sinks: vec![],
    };

    db.upsert_structure(&structure).await.expect("upsert succeeds");

    let hierarchy = db.hierarchy().await.expect("hierarchy");
    assert_eq!(hierarchy[0].meta_data, Some(serde_json::json!({"unit": "m3/h"})));

    let found = db.search_sources("src").await.expect("search_sources");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].meta_data, Some(serde_json::json!({"key": "value"})));
    assert_eq!(
        found[0].preset_filters.get("from"),
        Some(&serde_json::json!("2020-01-01"))
    );
    assert_eq!(found[0].passthrough_filters.len(), 1);
}

#[tokio::test]
async fn delete_structure_wipes_everything() {
    let (db, _dir) = temp_db().await;

    let structure = structure_models::CompleteStructure {
        element_types: vec![element_type("et-1")],
        thing_nodes: vec![root_node("root", "et-1")],
        sources: vec![],
        sinks: vec![],
    };
    db.upsert_structure(&structure).await.expect("upsert succeeds");
    assert!(!db.is_empty().await.expect("is_empty"));

    db.delete_structure().await.expect("delete succeeds");
    assert!(db.is_empty().await.expect("is_empty"));
}

fn sample_source(external_id: &str) -> Source {
    Source {
        external_id: external_id.to_string(),
        stakeholder_key: "acme".to_string(),
        name: format!("{external_id}-name"),
        display_path: "/root/src".to_string(),
        type_: structure_models::WireType::MetadataAny,
        visible: true,
        adapter_key: "demo-adapter".to_string(),
        source_id: "demo-source".to_string(),
        ref_key: None,
        ref_id: None,
        preset_filters: Default::default(),
        passthrough_filters: vec![],
        meta_data: None,
        thing_node_external_ids: vec![],
        id: None,
    }
}

fn sample_sink(external_id: &str) -> Sink {
    Sink {
        external_id: external_id.to_string(),
        stakeholder_key: "acme".to_string(),
        name: format!("{external_id}-name"),
        display_path: "/root/sink".to_string(),
        type_: structure_models::WireType::MetadataAny,
        visible: true,
        adapter_key: "demo-adapter".to_string(),
        sink_id: "demo-sink".to_string(),
        ref_key: None,
        ref_id: None,
        preset_filters: Default::default(),
        passthrough_filters: vec![],
        meta_data: None,
        thing_node_external_ids: vec![],
        id: None,
    }
}
