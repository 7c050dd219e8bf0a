use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// An interior node or leaf of the user-authored hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThingNode {
    pub external_id: String,
    pub stakeholder_key: String,
    /// Globally unique display name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meta_data: Option<Value>,

    /// Parent reference by external key. Absent ⇔ this node is a root.
    #[serde(default)]
    pub parent_external_node_id: Option<String>,
    /// Computed parent reference by internal key. Derived, never authored:
    /// the hierarchy sorter pre-populates it in memory, and persistence
    /// authoritatively rewrites it after upsert once internal UUIDs are
    /// known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_node_id: Option<Uuid>,

    pub element_type_external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl ThingNode {
    pub fn is_root(&self) -> bool {
        self.parent_external_node_id.is_none()
    }
}
