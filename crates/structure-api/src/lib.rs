//! HTTP surface for the virtual structure service: the read-only adapter
//! frontend and the protected maintenance endpoint.

mod dto;
mod error;
mod routes;
mod state;

pub use dto::AdapterInfo;
pub use error::{ApiError, Rejection, Request};
pub use routes::{build_router, DEFAULT_PREFIX};
pub use state::AppState;
