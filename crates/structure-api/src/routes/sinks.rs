use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dto::{EndpointDto, SinksSearchResponse};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    filter: Option<String>,
}

pub async fn search_sinks(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SinksSearchResponse>, ApiError> {
    let Some(filter) = params.filter else {
        return Ok(Json(SinksSearchResponse::new(Vec::new())));
    };

    let sinks = state.service.db().search_sinks(&filter).await?;
    let mut dtos = Vec::with_capacity(sinks.len());
    for sink in &sinks {
        let thing_node_id = representative_thing_node_id_for_sink(&state, sink).await?;
        dtos.push(EndpointDto::from_sink(sink, thing_node_id));
    }
    Ok(Json(SinksSearchResponse::new(dtos)))
}

pub async fn get_sink(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EndpointDto>, ApiError> {
    let sink = state
        .service
        .db()
        .sink_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("sink '{id}'")))?;
    let thing_node_id = representative_thing_node_id_for_sink(&state, &sink).await?;
    Ok(Json(EndpointDto::from_sink(&sink, thing_node_id)))
}

pub async fn get_sink_metadata(Path(_id): Path<Uuid>) -> Json<Vec<Value>> {
    Json(Vec::new())
}

async fn representative_thing_node_id_for_sink(
    state: &AppState,
    sink: &structure_models::Sink,
) -> Result<Option<Uuid>, ApiError> {
    let Some(id) = sink.id else {
        return Ok(None);
    };
    let ids = state.service.db().thing_node_ids_for_sink(id).await?;
    Ok(ids.into_iter().next())
}
