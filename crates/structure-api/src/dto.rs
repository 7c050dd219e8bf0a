//! Response shapes for the adapter frontend, translated from the internal
//! document model.

use std::collections::HashMap;

use serde::Serialize;
use structure_models::{Sink, Source, ThingNode};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AdapterInfo {
    pub id: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThingNodeDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
}

impl From<&ThingNode> for ThingNodeDto {
    fn from(node: &ThingNode) -> Self {
        ThingNodeDto {
            id: node.id.unwrap_or_default(),
            parent_id: node.parent_node_id,
            name: node.name.clone(),
            description: node.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDto {
    pub id: Uuid,
    pub thing_node_id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub visible: bool,
    pub path: String,
    pub metadata_key: Option<String>,
    pub filters: HashMap<String, FilterDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDto {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub required: bool,
}

impl EndpointDto {
    pub fn from_source(source: &Source, thing_node_id: Option<Uuid>) -> Self {
        EndpointDto {
            id: source.id.unwrap_or_default(),
            thing_node_id,
            name: source.name.clone(),
            type_: source.type_.to_string(),
            visible: source.visible,
            path: source.display_path.clone(),
            metadata_key: source.ref_key.clone(),
            filters: filters_by_internal_name(&source.passthrough_filters),
        }
    }

    pub fn from_sink(sink: &Sink, thing_node_id: Option<Uuid>) -> Self {
        EndpointDto {
            id: sink.id.unwrap_or_default(),
            thing_node_id,
            name: sink.name.clone(),
            type_: sink.type_.to_string(),
            visible: sink.visible,
            path: sink.display_path.clone(),
            metadata_key: sink.ref_key.clone(),
            filters: filters_by_internal_name(&sink.passthrough_filters),
        }
    }
}

fn filters_by_internal_name(filters: &[structure_models::Filter]) -> HashMap<String, FilterDto> {
    filters
        .iter()
        .map(|f| {
            (
                f.internal_name(),
                FilterDto {
                    name: f.name.clone(),
                    type_: "free_text",
                    required: f.required,
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDto {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub thing_nodes: Vec<ThingNodeDto>,
    pub sources: Vec<EndpointDto>,
    pub sinks: Vec<EndpointDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesSearchResponse {
    pub result_count: usize,
    pub sources: Vec<EndpointDto>,
}

impl SourcesSearchResponse {
    pub fn new(sources: Vec<EndpointDto>) -> Self {
        SourcesSearchResponse {
            result_count: sources.len(),
            sources,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinksSearchResponse {
    pub result_count: usize,
    pub sinks: Vec<EndpointDto>,
}

impl SinksSearchResponse {
    pub fn new(sinks: Vec<EndpointDto>) -> Self {
        SinksSearchResponse {
            result_count: sinks.len(),
            sinks,
        }
    }
}
