use structure_core::StructureService;

use crate::dto::AdapterInfo;

/// Shared application state handed to every route handler. Cheap to clone:
/// `service` wraps a pooled database handle.
#[derive(Clone)]
pub struct AppState {
    pub service: StructureService,
    pub info: AdapterInfo,
    pub maintenance_secret: String,
}

impl AppState {
    pub fn new(service: StructureService, info: AdapterInfo, maintenance_secret: String) -> Self {
        AppState {
            service,
            info,
            maintenance_secret,
        }
    }
}
