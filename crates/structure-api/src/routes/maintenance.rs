use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use structure_models::CompleteStructure;
use subtle::ConstantTimeEq;
use validator::Validate;

use crate::error::{ApiError, Request};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct MaintenancePayload {
    #[validate(length(min = 1))]
    pub maintenance_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStructureBody {
    pub maintenance_payload: MaintenancePayload,
    pub new_structure: CompleteStructure,
}

impl Validate for UpdateStructureBody {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.maintenance_payload.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuery {
    #[serde(default)]
    delete_existing_structure: bool,
}

/// `PUT /structure/update?delete_existing_structure=<bool>`. Authenticates
/// the presented maintenance secret with a constant-time comparison before
/// touching the database, then optionally wipes the existing catalog and
/// upserts the replacement.
pub async fn update_structure(
    State(state): State<AppState>,
    Query(params): Query<UpdateQuery>,
    Request(body): Request<UpdateStructureBody>,
) -> Result<StatusCode, ApiError> {
    let presented = body.maintenance_payload.maintenance_secret.as_bytes();
    let expected = state.maintenance_secret.as_bytes();
    let secrets_match = presented.len() == expected.len()
        && bool::from(presented.ct_eq(expected));
    if !secrets_match {
        return Err(ApiError::Unauthorized);
    }

    if params.delete_existing_structure {
        state.service.delete_structure().await?;
    }
    state.service.update_structure(&body.new_structure).await?;

    Ok(StatusCode::NO_CONTENT)
}
