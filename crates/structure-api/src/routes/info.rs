use axum::extract::State;
use axum::Json;

use crate::dto::AdapterInfo;
use crate::state::AppState;

pub async fn get_info(State(state): State<AppState>) -> Json<AdapterInfo> {
    Json(state.info.clone())
}
