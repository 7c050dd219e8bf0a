use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Request wraps a JSON-deserialized request body that also implements
/// `validator::Validate`, matching the failure-to-422 behavior callers
/// expect from the maintenance endpoint's body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Request<T>(pub T);

/// Reasons a request extraction can fail, ahead of any handler logic.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Json(#[from] axum::extract::rejection::JsonRejection),
}

/// Every way a request to the adapter frontend or maintenance endpoint can
/// fail, mapped directly to an HTTP status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("maintenance secret mismatch")]
    Unauthorized,
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
    #[error(transparent)]
    InvalidRequest(#[from] Rejection),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<structure_db::Error> for ApiError {
    fn from(err: structure_db::Error) -> Self {
        match err {
            structure_db::Error::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<structure_core::Error> for ApiError {
    fn from(err: structure_core::Error) -> Self {
        use structure_core::Error as CoreError;
        match err {
            CoreError::NotFound(what) => ApiError::NotFound(what),
            CoreError::Validation(e) => ApiError::InvalidStructure(e.to_string()),
            CoreError::Parse(e) => ApiError::InvalidStructure(e.to_string()),
            CoreError::Db(structure_db::Error::NotFound(what)) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl<T, S> axum::extract::FromRequest<S> for Request<T>
where
    T: serde::de::DeserializeOwned + validator::Validate,
    S: Send + Sync,
    axum::extract::Json<T>:
        axum::extract::FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Json(value) = axum::extract::Json::<T>::from_request(req, state)
            .await
            .map_err(Rejection::from)?;
        value.validate().map_err(Rejection::from)?;
        Ok(Request(value))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::InvalidStructure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidRequest(Rejection::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidRequest(Rejection::Json(_)) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
