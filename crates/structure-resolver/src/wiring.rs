use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use structure_models::WireType;

/// The marker `adapter_id` this resolver looks for and rewrites.
pub const VIRTUAL_STRUCTURE_ADAPTER: &str = "virtual-structure-adapter";

/// A single input or output binding in a workflow's wiring. Untouched if
/// `adapter_id` isn't the virtual-structure adapter; otherwise rewritten in
/// place by [`crate::resolve`] to point at the referenced source/sink's
/// backing adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wiring {
    pub adapter_id: String,
    pub ref_id: String,
    #[serde(rename = "type")]
    pub type_: WireType,
    #[serde(default)]
    pub filters: HashMap<String, Value>,
    #[serde(default)]
    pub ref_key: Option<String>,
    #[serde(default)]
    pub ref_id_type: Option<String>,
}

impl Wiring {
    pub fn is_virtual_structure_reference(&self) -> bool {
        self.adapter_id == VIRTUAL_STRUCTURE_ADAPTER
    }
}

/// A workflow's complete set of input and output wirings, as handed to this
/// subsystem for resolution before execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowWiring {
    #[serde(default)]
    pub inputs: Vec<Wiring>,
    #[serde(default)]
    pub outputs: Vec<Wiring>,
}
