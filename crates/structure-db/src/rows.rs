use std::collections::HashMap;
use std::str::FromStr;

use sqlx::types::Json;
use structure_models::{ElementType, Filter, Sink, Source, ThingNode, WireType};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ElementTypeRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<ElementTypeRow> for ElementType {
    fn from(row: ElementTypeRow) -> Self {
        ElementType {
            external_id: row.external_id,
            stakeholder_key: row.stakeholder_key,
            name: row.name,
            description: row.description,
            id: Some(row.id),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ThingNodeRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_external_node_id: Option<String>,
    pub parent_node_id: Option<Uuid>,
    pub element_type_external_id: String,
    pub element_type_id: Uuid,
    pub meta_data: Option<serde_json::Value>,
}

impl From<ThingNodeRow> for ThingNode {
    fn from(row: ThingNodeRow) -> Self {
        ThingNode {
            external_id: row.external_id,
            stakeholder_key: row.stakeholder_key,
            name: row.name,
            description: row.description,
            meta_data: row.meta_data,
            parent_external_node_id: row.parent_external_node_id,
            parent_node_id: row.parent_node_id,
            element_type_external_id: row.element_type_external_id,
            element_type_id: Some(row.element_type_id),
            id: Some(row.id),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SourceRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub type_: String,
    pub visible: bool,
    pub display_path: String,
    pub adapter_key: String,
    pub source_id: String,
    pub ref_key: Option<String>,
    pub ref_id: Option<String>,
    pub meta_data: Option<serde_json::Value>,
    pub preset_filters: Json<HashMap<String, serde_json::Value>>,
    pub passthrough_filters: Option<Json<Vec<Filter>>>,
    pub thing_node_external_ids: Option<Json<Vec<String>>>,
}

impl TryFrom<SourceRow> for Source {
    type Error = String;

    fn try_from(row: SourceRow) -> Result<Self, Self::Error> {
        Ok(Source {
            external_id: row.external_id,
            stakeholder_key: row.stakeholder_key,
            name: row.name,
            display_path: row.display_path,
            type_: WireType::from_str(&row.type_)?,
            visible: row.visible,
            adapter_key: row.adapter_key,
            source_id: row.source_id,
            ref_key: row.ref_key,
            ref_id: row.ref_id,
            preset_filters: row.preset_filters.0,
            passthrough_filters: row.passthrough_filters.map(|j| j.0).unwrap_or_default(),
            meta_data: row.meta_data,
            thing_node_external_ids: row.thing_node_external_ids.map(|j| j.0).unwrap_or_default(),
            id: Some(row.id),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SinkRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub type_: String,
    pub visible: bool,
    pub display_path: String,
    pub adapter_key: String,
    pub sink_id: String,
    pub ref_key: Option<String>,
    pub ref_id: Option<String>,
    pub meta_data: Option<serde_json::Value>,
    pub preset_filters: Json<HashMap<String, serde_json::Value>>,
    pub passthrough_filters: Option<Json<Vec<Filter>>>,
    pub thing_node_external_ids: Option<Json<Vec<String>>>,
}

impl TryFrom<SinkRow> for Sink {
    type Error = String;

    fn try_from(row: SinkRow) -> Result<Self, Self::Error> {
        Ok(Sink {
            external_id: row.external_id,
            stakeholder_key: row.stakeholder_key,
            name: row.name,
            display_path: row.display_path,
            type_: WireType::from_str(&row.type_)?,
            visible: row.visible,
            adapter_key: row.adapter_key,
            sink_id: row.sink_id,
            ref_key: row.ref_key,
            ref_id: row.ref_id,
            preset_filters: row.preset_filters.0,
            passthrough_filters: row.passthrough_filters.map(|j| j.0).unwrap_or_default(),
            meta_data: row.meta_data,
            thing_node_external_ids: row.thing_node_external_ids.map(|j| j.0).unwrap_or_default(),
            id: Some(row.id),
        })
    }
}
