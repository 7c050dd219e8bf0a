use crate::{Filter, WireType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// A reference to a data-producing endpoint in some backing adapter,
/// exposed through this catalog under a virtual identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    pub external_id: String,
    pub stakeholder_key: String,
    /// Unique within sources.
    pub name: String,
    pub display_path: String,
    #[serde(rename = "type")]
    pub type_: WireType,
    pub visible: bool,

    pub adapter_key: String,
    pub source_id: String,
    #[serde(default)]
    pub ref_key: Option<String>,
    #[serde(default)]
    pub ref_id: Option<String>,

    /// Always applied; preset values overwrite caller-supplied values on
    /// key collision during wiring resolution.
    #[serde(default)]
    pub preset_filters: HashMap<String, Value>,
    /// May be empty; `internal_name`s must be unique within this source.
    #[serde(default)]
    pub passthrough_filters: Vec<Filter>,

    #[serde(default)]
    pub meta_data: Option<Value>,

    /// ThingNode external IDs this source is attached to. No duplicates;
    /// every entry must resolve within the same document.
    #[serde(default)]
    pub thing_node_external_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}
