use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dto::{EndpointDto, SourcesSearchResponse};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    filter: Option<String>,
}

/// `GET /sources?filter=<substring>`. A missing filter yields an empty
/// result rather than every source — callers must opt in to a search.
pub async fn search_sources(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SourcesSearchResponse>, ApiError> {
    let Some(filter) = params.filter else {
        return Ok(Json(SourcesSearchResponse::new(Vec::new())));
    };

    let sources = state.service.db().search_sources(&filter).await?;
    let mut dtos = Vec::with_capacity(sources.len());
    for source in &sources {
        let thing_node_id = representative_thing_node_id_for_source(&state, source).await?;
        dtos.push(EndpointDto::from_source(source, thing_node_id));
    }
    Ok(Json(SourcesSearchResponse::new(dtos)))
}

pub async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EndpointDto>, ApiError> {
    let source = state
        .service
        .db()
        .source_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("source '{id}'")))?;
    let thing_node_id = representative_thing_node_id_for_source(&state, &source).await?;
    Ok(Json(EndpointDto::from_source(&source, thing_node_id)))
}

pub async fn get_source_metadata(Path(_id): Path<Uuid>) -> Json<Vec<Value>> {
    Json(Vec::new())
}

async fn representative_thing_node_id_for_source(
    state: &AppState,
    source: &structure_models::Source,
) -> Result<Option<Uuid>, ApiError> {
    let Some(id) = source.id else {
        return Ok(None);
    };
    let ids = state.service.db().thing_node_ids_for_source(id).await?;
    Ok(ids.into_iter().next())
}
