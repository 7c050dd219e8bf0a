use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A categorical label attached to a [`crate::ThingNode`]. Created/updated
/// on import, deleted only by a full wipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementType {
    pub external_id: String,
    pub stakeholder_key: String,
    /// Globally unique display name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Assigned on first insert; absent for documents authored by hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}
