mod info;
mod maintenance;
mod sinks;
mod sources;
mod structure;
mod thing_nodes;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Default mount point for the adapter-frontend routes. The maintenance
/// endpoint is intentionally not nested under this prefix.
pub const DEFAULT_PREFIX: &str = "/adapters/virtual_structure";

/// Builds the full HTTP surface: the adapter-frontend read routes under
/// `prefix`, and the maintenance write route at its own top-level path.
pub fn build_router(state: AppState, prefix: &str) -> Router {
    let adapter_routes = Router::new()
        .route("/info", get(info::get_info))
        .route("/structure", get(structure::get_structure))
        .route("/thingNodes/:id", get(thing_nodes::get_thing_node))
        .route(
            "/thingNodes/:id/metadata/",
            get(thing_nodes::get_thing_node_metadata),
        )
        .route("/sources", get(sources::search_sources))
        .route("/sources/:id", get(sources::get_source))
        .route("/sources/:id/metadata/", get(sources::get_source_metadata))
        .route("/sinks", get(sinks::search_sinks))
        .route("/sinks/:id", get(sinks::get_sink))
        .route("/sinks/:id/metadata/", get(sinks::get_sink_metadata));

    let maintenance_routes =
        Router::new().route("/structure/update", put(maintenance::update_structure));

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .nest(prefix, adapter_routes)
        .merge(maintenance_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
