use structure_core::{PrepopulationConfig, StructureService};
use structure_db::{Db, DbPool};
use structure_models::{CompleteStructure, ElementType, ThingNode};

async fn temp_service() -> (StructureService, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("structure.sqlite");
    let pool = DbPool::connect_sqlite(path.to_str().unwrap())
        .await
        .expect("connect sqlite");
    (StructureService::new(Db::new(pool)), dir)
}

fn sample_structure() -> CompleteStructure {
    CompleteStructure {
        element_types: vec![ElementType {
            external_id: "et-1".to_string(),
            stakeholder_key: "acme".to_string(),
            name: "et-1-name".to_string(),
            description: None,
            id: None,
        }],
        thing_nodes: vec![ThingNode {
            external_id: "root".to_string(),
            stakeholder_key: "acme".to_string(),
            name: "root-name".to_string(),
            description: None,
            meta_data: None,
            parent_external_node_id: None,
            parent_node_id: None,
            element_type_external_id: "et-1".to_string(),
            element_type_id: None,
            id: None,
        }],
        sources: vec![],
        sinks: vec![],
    }
}

#[tokio::test]
async fn are_structure_tables_empty_reflects_state() {
    let (service, _dir) = temp_service().await;
    assert!(service.are_structure_tables_empty().await.expect("check empty"));

    service.update_structure(&sample_structure()).await.expect("update succeeds");
    assert!(!service.are_structure_tables_empty().await.expect("check empty"));
}

#[tokio::test]
async fn get_children_with_no_parent_returns_roots_only() {
    let (service, _dir) = temp_service().await;
    service.update_structure(&sample_structure()).await.expect("update succeeds");

    let (nodes, sources, sinks) = service.get_children(None).await.expect("get_children");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].external_id, "root");
    assert!(sources.is_empty());
    assert!(sinks.is_empty());
}

#[tokio::test]
async fn get_children_with_unknown_parent_is_not_found() {
    let (service, _dir) = temp_service().await;
    service.update_structure(&sample_structure()).await.expect("update succeeds");

    let err = service
        .get_children(Some(uuid::Uuid::new_v4()))
        .await
        .expect_err("unknown parent must fail");
    assert!(matches!(err, structure_core::Error::NotFound(_)));
}

#[tokio::test]
async fn update_structure_rejects_invalid_document() {
    let (service, _dir) = temp_service().await;
    let invalid = CompleteStructure::default();
    let err = service
        .update_structure(&invalid)
        .await
        .expect_err("empty element_types must fail validation");
    assert!(matches!(err, structure_core::Error::Validation(_)));
}

#[tokio::test]
async fn prepopulation_driver_loads_inline_structure_once() {
    let (service, _dir) = temp_service().await;
    let config = PrepopulationConfig::from_inline(sample_structure(), false);
    config.run(&service).await.expect("prepopulation succeeds");

    assert!(!service.are_structure_tables_empty().await.expect("check empty"));
}

#[tokio::test]
async fn prepopulation_driver_overwrites_when_requested() {
    let (service, _dir) = temp_service().await;
    service.update_structure(&sample_structure()).await.expect("seed structure");

    let mut replacement = sample_structure();
    replacement.thing_nodes[0].external_id = "replacement-root".to_string();
    replacement.thing_nodes[0].name = "replacement-root-name".to_string();

    let config = PrepopulationConfig::from_inline(replacement, true);
    config.run(&service).await.expect("prepopulation succeeds");

    let (nodes, _, _) = service.get_children(None).await.expect("get_children");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].external_id, "replacement-root");
}
