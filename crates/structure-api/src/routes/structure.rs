use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::{EndpointDto, StructureDto, ThingNodeDto};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StructureQuery {
    #[serde(rename = "parentId")]
    parent_id: Option<Uuid>,
}

/// `GET /structure?parentId=<uuid?>`. Returns the roots when `parentId` is
/// absent, or the named thing node's immediate children, sources, and
/// sinks otherwise.
pub async fn get_structure(
    State(state): State<AppState>,
    Query(params): Query<StructureQuery>,
) -> Result<Json<StructureDto>, ApiError> {
    let dto = match params.parent_id {
        None => {
            let (roots, _, _) = state.service.get_children(None).await?;
            StructureDto {
                id: None,
                name: None,
                thing_nodes: roots.iter().map(ThingNodeDto::from).collect(),
                sources: Vec::new(),
                sinks: Vec::new(),
            }
        }
        Some(parent_id) => {
            let parent = state
                .service
                .db()
                .thing_node_by_id(parent_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("thing_node '{parent_id}'")))?;
            let (children, sources, sinks) = state.service.get_children(Some(parent_id)).await?;
            StructureDto {
                id: Some(parent_id),
                name: Some(parent.name),
                thing_nodes: children.iter().map(ThingNodeDto::from).collect(),
                sources: sources
                    .iter()
                    .map(|s| EndpointDto::from_source(s, Some(parent_id)))
                    .collect(),
                sinks: sinks
                    .iter()
                    .map(|s| EndpointDto::from_sink(s, Some(parent_id)))
                    .collect(),
            }
        }
    };
    Ok(Json(dto))
}
