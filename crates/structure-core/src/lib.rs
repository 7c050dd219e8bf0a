//! Structure service façade and startup prepopulation driver.

mod error;
mod prepopulate;
mod service;

pub use error::Error;
pub use prepopulate::{PrepopulationConfig, RawPrepopulationConfig};
pub use service::StructureService;
