use structure_db::{Db, DbPool};
use structure_models::{CompleteStructure, ElementType, ThingNode};

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

fn node(external_id: &str, parent: Option<&str>) -> ThingNode {
    ThingNode {
        external_id: external_id.to_string(),
        stakeholder_key: "acme".to_string(),
        name: format!("{external_id}-name"),
        description: None,
        meta_data: None,
        parent_external_node_id: parent.map(|s| s.to_string()),
        parent_node_id: None,
        element_type_external_id: "et-1".to_string(),
        element_type_id: None,
        id: None,
    }
}

/// Captures the breadth-first ordering the persisted hierarchy resolves to
/// for a plant/area/line fixture with a lexicographic sibling tie. Internal
/// ids vary per run, so only the `external_id` ordering is snapshotted.
#[tokio::test]
async fn hierarchy_resolves_plant_area_line_fixture_breadth_first() {
    let (db, _dir) = temp_db().await;

    let structure = CompleteStructure {
        element_types: vec![element_type("et-1")],
        thing_nodes: vec![
            node("plant-b", None),
            node("plant-a", None),
            node("line-1", Some("area-1")),
            node("area-1", Some("plant-a")),
            node("area-2", Some("plant-a")),
            node("line-2", Some("area-1")),
        ],
        sources: vec![],
        sinks: vec![],
    };

    db.upsert_structure(&structure).await.expect("upsert succeeds");

    let ordered: Vec<String> = db
        .hierarchy()
        .await
        .expect("hierarchy")
        .into_iter()
        .map(|n| n.external_id)
        .collect();

    insta::assert_debug_snapshot!(ordered, @r#"
    [
        "plant-a",
        "plant-b",
        "area-1",
        "area-2",
        "line-1",
        "line-2",
    ]
    "#);
}
