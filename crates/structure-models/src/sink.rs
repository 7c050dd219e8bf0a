use crate::{Filter, WireType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// A reference to a data-consuming endpoint in some backing adapter.
/// Mirror of [`crate::Source`] with the same fields and invariants,
/// substituting `sink_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sink {
    pub external_id: String,
    pub stakeholder_key: String,
    /// Unique within sinks.
    pub name: String,
    pub display_path: String,
    #[serde(rename = "type")]
    pub type_: WireType,
    pub visible: bool,

    pub adapter_key: String,
    pub sink_id: String,
    #[serde(default)]
    pub ref_key: Option<String>,
    #[serde(default)]
    pub ref_id: Option<String>,

    #[serde(default)]
    pub preset_filters: HashMap<String, Value>,
    #[serde(default)]
    pub passthrough_filters: Vec<Filter>,

    #[serde(default)]
    pub meta_data: Option<Value>,

    #[serde(default)]
    pub thing_node_external_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}
