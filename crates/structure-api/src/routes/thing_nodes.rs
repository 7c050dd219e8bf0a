use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::dto::ThingNodeDto;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_thing_node(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ThingNodeDto>, ApiError> {
    let node = state
        .service
        .db()
        .thing_node_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("thing_node '{id}'")))?;
    Ok(Json(ThingNodeDto::from(&node)))
}

/// Metadata browsing is not yet implemented; always returns an empty list.
pub async fn get_thing_node_metadata(Path(_id): Path<Uuid>) -> Json<Vec<Value>> {
    Json(Vec::new())
}
