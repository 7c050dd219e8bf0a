use axum::body::Body;
use axum::http::{Request as HttpRequest, StatusCode};
use serde_json::{json, Value};
use structure_api::{build_router, AdapterInfo, AppState, DEFAULT_PREFIX};
use structure_core::StructureService;
use structure_db::{Db, DbPool};
use tower::ServiceExt;

async fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("structure.sqlite");
    let pool = DbPool::connect_sqlite(path.to_str().unwrap())
        .await
        .expect("connect sqlite");
    let service = StructureService::new(Db::new(pool));
    let state = AppState::new(
        service,
        AdapterInfo {
            id: "virtual-structure-adapter".to_string(),
            name: "Virtual Structure Adapter".to_string(),
            version: "0.1.0".to_string(),
        },
        "top-secret".to_string(),
    );
    (state, dir)
}

fn sample_structure() -> Value {
    json!({
        "element_types": [{
            "external_id": "et-1",
            "stakeholder_key": "acme",
            "name": "et-1-name"
        }],
        "thing_nodes": [{
            "external_id": "root",
            "stakeholder_key": "acme",
            "name": "root-name",
            "element_type_external_id": "et-1"
        }],
        "sources": [],
        "sinks": []
    })
}

#[tokio::test]
async fn info_endpoint_requires_no_auth() {
    let (state, _dir) = test_state().await;
    let app = build_router(state, DEFAULT_PREFIX);

    let response = app
        .oneshot(
            HttpRequest::builder()
                .uri(format!("{DEFAULT_PREFIX}/info"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["id"], "virtual-structure-adapter");
}

#[tokio::test]
async fn structure_with_no_parent_returns_empty_roots_before_any_import() {
    let (state, _dir) = test_state().await;
    let app = build_router(state, DEFAULT_PREFIX);

    let response = app
        .oneshot(
            HttpRequest::builder()
                .uri(format!("{DEFAULT_PREFIX}/structure"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["thingNodes"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn maintenance_endpoint_rejects_wrong_secret_with_403() {
    let (state, _dir) = test_state().await;
    let app = build_router(state, DEFAULT_PREFIX);

    let body = json!({
        "maintenance_payload": {"maintenance_secret": "wrong"},
        "new_structure": sample_structure(),
    });

    let response = app
        .oneshot(
            HttpRequest::builder()
                .method("PUT")
                .uri("/structure/update")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn maintenance_endpoint_upserts_structure_and_makes_it_browsable() {
    let (state, _dir) = test_state().await;
    let app = build_router(state, DEFAULT_PREFIX);

    let body = json!({
        "maintenance_payload": {"maintenance_secret": "top-secret"},
        "new_structure": sample_structure(),
    });

    let response = app
        .clone()
        .oneshot(
            HttpRequest::builder()
                .method("PUT")
                .uri("/structure/update")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            HttpRequest::builder()
                .uri(format!("{DEFAULT_PREFIX}/structure"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["thingNodes"][0]["name"], "root-name");
}

#[tokio::test]
async fn unknown_thing_node_returns_404() {
    let (state, _dir) = test_state().await;
    let app = build_router(state, DEFAULT_PREFIX);

    let response = app
        .oneshot(
            HttpRequest::builder()
                .uri(format!(
                    "{DEFAULT_PREFIX}/thingNodes/{}",
                    uuid::Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
