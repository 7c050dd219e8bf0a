use std::collections::HashMap;

use serde_json::Value;
use structure_db::Db;
use structure_models::{Sink, Source};
use uuid::Uuid;

use crate::wiring::{Wiring, WorkflowWiring};
use crate::Error;

const THINGNODE_REF_ID_TYPE: &str = "THINGNODE";

/// Resolves every wiring in `wiring` whose `adapter_id` marks it as a
/// virtual-structure reference, rewriting it in place to point at the
/// referenced source's or sink's backing adapter. Wirings with any other
/// `adapter_id` pass through untouched.
///
/// Fails the whole resolution if any referenced source or sink cannot be
/// found — there is no partial success.
pub async fn resolve(wiring: &mut WorkflowWiring, db: &Db) -> Result<(), Error> {
    let source_ids = collect_referenced_ids(&wiring.inputs)?;
    let sink_ids = collect_referenced_ids(&wiring.outputs)?;

    let sources = if source_ids.is_empty() {
        HashMap::new()
    } else {
        db.sources_by_ids(&source_ids).await?
    };
    let sinks = if sink_ids.is_empty() {
        HashMap::new()
    } else {
        db.sinks_by_ids(&sink_ids).await?
    };

    for input in &mut wiring.inputs {
        if !input.is_virtual_structure_reference() {
            continue;
        }
        let id = parse_ref_id(&input.ref_id)?;
        let source = sources.get(&id).ok_or_else(|| {
            tracing::warn!(ref_id = %input.ref_id, "wiring referenced a source that was not found");
            Error::AdapterHandling
        })?;
        rewrite_for_source(input, source);
    }

    for output in &mut wiring.outputs {
        if !output.is_virtual_structure_reference() {
            continue;
        }
        let id = parse_ref_id(&output.ref_id)?;
        let sink = sinks.get(&id).ok_or_else(|| {
            tracing::warn!(ref_id = %output.ref_id, "wiring referenced a sink that was not found");
            Error::AdapterHandling
        })?;
        rewrite_for_sink(output, sink);
    }

    Ok(())
}

fn collect_referenced_ids(wirings: &[Wiring]) -> Result<Vec<Uuid>, Error> {
    wirings
        .iter()
        .filter(|w| w.is_virtual_structure_reference())
        .map(|w| parse_ref_id(&w.ref_id))
        .collect()
}

fn parse_ref_id(ref_id: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(ref_id).map_err(|_| Error::AdapterHandling)
}

fn rewrite_for_source(wiring: &mut Wiring, source: &Source) {
    wiring.adapter_id = source.adapter_key.clone();
    if wiring.type_.is_metadata_any() {
        wiring.ref_id = source.ref_id.clone().unwrap_or_default();
        wiring.ref_key = source.ref_key.clone();
        wiring.ref_id_type = Some(THINGNODE_REF_ID_TYPE.to_string());
    } else {
        wiring.ref_id = source.source_id.clone();
    }
    wiring.filters = merge_filters(&wiring.filters, &source.preset_filters);
}

fn rewrite_for_sink(wiring: &mut Wiring, sink: &Sink) {
    wiring.adapter_id = sink.adapter_key.clone();
    if wiring.type_.is_metadata_any() {
        wiring.ref_id = sink.ref_id.clone().unwrap_or_default();
        wiring.ref_key = sink.ref_key.clone();
        wiring.ref_id_type = Some(THINGNODE_REF_ID_TYPE.to_string());
    } else {
        wiring.ref_id = sink.sink_id.clone();
    }
    wiring.filters = merge_filters(&wiring.filters, &sink.preset_filters);
}

/// Merges caller-supplied filters with backing preset filters. Preset
/// values overwrite caller values on key collision — the catalog's
/// configuration always wins.
fn merge_filters(
    caller: &HashMap<String, Value>,
    presets: &HashMap<String, Value>,
) -> HashMap<String, Value> {
    let mut merged = caller.clone();
    for (key, value) in presets {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
