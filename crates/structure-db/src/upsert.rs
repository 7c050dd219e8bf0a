use std::collections::HashMap;

use sqlx::QueryBuilder;
use structure_models::{ElementType, Sink, Source, ThingNode};
use uuid::Uuid;

use crate::error::classify_write_error;
use crate::pool::DbTx;
use crate::Error;

/// Maximum rows pushed into a single multi-row `INSERT ... VALUES` statement.
/// Keeps us well under both backends' bind-parameter limits.
const BATCH_SIZE: usize = 500;

/// Identity key used to correlate a document entity with the row it was
/// upserted as: `(stakeholder_key, external_id)`.
pub type IdentityKey = (String, String);

fn identity_key(stakeholder_key: &str, external_id: &str) -> IdentityKey {
    (stakeholder_key.to_string(), external_id.to_string())
}

pub(crate) async fn upsert_element_types(
    tx: &mut DbTx<'_>,
    element_types: &[ElementType],
) -> Result<HashMap<IdentityKey, Uuid>, Error> {
    let mut ids = HashMap::with_capacity(element_types.len());
    for batch in element_types.chunks(BATCH_SIZE) {
        let rows = match tx {
            DbTx::Postgres(tx) => {
                let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
                    "insert into structure_element_type (id, external_id, stakeholder_key, name, description) ",
                );
                qb.push_values(batch, |mut b, et| {
                    b.push_bind(Uuid::new_v4())
                        .push_bind(&et.external_id)
                        .push_bind(&et.stakeholder_key)
                        .push_bind(&et.name)
                        .push_bind(&et.description);
                });
                qb.push(
                    " on conflict (external_id, stakeholder_key) do update set \
                      name = excluded.name, description = excluded.description \
                      returning id, external_id, stakeholder_key",
                );
                qb.build_query_as::<(Uuid, String, String)>()
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(classify_write_error)?
            }
            DbTx::Sqlite(tx) => {
                let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
                    "insert into structure_element_type (id, external_id, stakeholder_key, name, description) ",
                );
                qb.push_values(batch, |mut b, et| {
                    b.push_bind(Uuid::new_v4())
                        .push_bind(&et.external_id)
                        .push_bind(&et.stakeholder_key)
                        .push_bind(&et.name)
                        .push_bind(&et.description);
                });
                qb.push(
                    " on conflict (external_id, stakeholder_key) do update set \
                      name = excluded.name, description = excluded.description \
                      returning id, external_id, stakeholder_key",
                );
                qb.build_query_as::<(Uuid, String, String)>()
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(classify_write_error)?
            }
        };
        for (id, external_id, stakeholder_key) in rows {
            ids.insert(identity_key(&stakeholder_key, &external_id), id);
        }
    }
    Ok(ids)
}

pub(crate) async fn upsert_thing_nodes(
    tx: &mut DbTx<'_>,
    thing_nodes: &[ThingNode],
    element_type_ids: &HashMap<IdentityKey, Uuid>,
) -> Result<HashMap<IdentityKey, Uuid>, Error> {
    let mut ids = HashMap::with_capacity(thing_nodes.len());
    for batch in thing_nodes.chunks(BATCH_SIZE) {
        let rows = match tx {
            DbTx::Postgres(tx) => {
                let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
                    "insert into structure_thing_node \
                     (id, external_id, stakeholder_key, name, description, \
                      parent_external_node_id, parent_node_id, element_type_external_id, \
                      element_type_id, meta_data) ",
                );
                qb.push_values(batch, |mut b, tn| {
                    let element_type_id = element_type_ids
                        .get(&identity_key(&tn.stakeholder_key, &tn.element_type_external_id))
                        .copied();
                    b.push_bind(Uuid::new_v4())
                        .push_bind(&tn.external_id)
                        .push_bind(&tn.stakeholder_key)
                        .push_bind(&tn.name)
                        .push_bind(&tn.description)
                        .push_bind(&tn.parent_external_node_id)
                        .push_bind(None::<Uuid>)
                        .push_bind(&tn.element_type_external_id)
                        .push_bind(element_type_id)
                        .push_bind(tn.meta_data.clone());
                });
                qb.push(
                    " on conflict (external_id, stakeholder_key) do update set \
                      name = excluded.name, description = excluded.description, \
                      parent_external_node_id = excluded.parent_external_node_id, \
                      element_type_external_id = excluded.element_type_external_id, \
                      element_type_id = excluded.element_type_id, \
                      meta_data = excluded.meta_data \
                      returning id, external_id, stakeholder_key",
                );
                qb.build_query_as::<(Uuid, String, String)>()
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(classify_write_error)?
            }
            DbTx::Sqlite(tx) => {
                let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
                    "insert into structure_thing_node \
                     (id, external_id, stakeholder_key, name, description, \
                      parent_external_node_id, parent_node_id, element_type_external_id, \
                      element_type_id, meta_data) ",
                );
                qb.push_values(batch, |mut b, tn| {
                    let element_type_id = element_type_ids
                        .get(&identity_key(&tn.stakeholder_key, &tn.element_type_external_id))
                        .copied();
                    b.push_bind(Uuid::new_v4())
                        .push_bind(&tn.external_id)
                        .push_bind(&tn.stakeholder_key)
                        .push_bind(&tn.name)
                        .push_bind(&tn.description)
                        .push_bind(&tn.parent_external_node_id)
                        .push_bind(None::<Uuid>)
                        .push_bind(&tn.element_type_external_id)
                        .push_bind(element_type_id)
                        .push_bind(tn.meta_data.clone());
                });
                qb.push(
                    " on conflict (external_id, stakeholder_key) do update set \
                      name = excluded.name, description = excluded.description, \
                      parent_external_node_id = excluded.parent_external_node_id, \
                      element_type_external_id = excluded.element_type_external_id, \
                      element_type_id = excluded.element_type_id, \
                      meta_data = excluded.meta_data \
                      returning id, external_id, stakeholder_key",
                );
                qb.build_query_as::<(Uuid, String, String)>()
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(classify_write_error)?
            }
        };
        for (id, external_id, stakeholder_key) in rows {
            ids.insert(identity_key(&stakeholder_key, &external_id), id);
        }
    }

    rewrite_parent_pointers(tx, thing_nodes, &ids).await?;
    Ok(ids)
}

/// Second pass: every thing node's `parent_node_id` column is only resolvable
/// once every node in the batch has been assigned an id, since parents may
/// appear later in the input than their children.
async fn rewrite_parent_pointers(
    tx: &mut DbTx<'_>,
    thing_nodes: &[ThingNode],
    ids: &HashMap<IdentityKey, Uuid>,
) -> Result<(), Error> {
    for tn in thing_nodes {
        let Some(parent_external_id) = &tn.parent_external_node_id else {
            continue;
        };
        let self_id = ids
            .get(&identity_key(&tn.stakeholder_key, &tn.external_id))
            .copied()
            .expect("thing node was just upserted");
        // Whole-document validation already guarantees this resolves or the
        // node is root; a miss here would only happen for a node excluded
        // from `ids` by some upstream filtering. Skip rather than panic.
        let Some(parent_id) = ids
            .get(&identity_key(&tn.stakeholder_key, parent_external_id))
            .copied()
        else {
            continue;
        };

        match tx {
            DbTx::Postgres(tx) => {
                sqlx::query("update structure_thing_node set parent_node_id = $1 where id = $2")
                    .bind(parent_id)
                    .bind(self_id)
                    .execute(&mut **tx)
                    .await
                    .map_err(classify_write_error)?;
            }
            DbTx::Sqlite(tx) => {
                sqlx::query("update structure_thing_node set parent_node_id = ? where id = ?")
                    .bind(parent_id)
                    .bind(self_id)
                    .execute(&mut **tx)
                    .await
                    .map_err(classify_write_error)?;
            }
        }
    }
    Ok(())
}

pub(crate) async fn upsert_sources(
    tx: &mut DbTx<'_>,
    sources: &[Source],
) -> Result<HashMap<IdentityKey, Uuid>, Error> {
    let mut ids = HashMap::with_capacity(sources.len());
    for batch in sources.chunks(BATCH_SIZE) {
        let rows = upsert_endpoint_batch(tx, batch, Endpoint::Source).await?;
        for (id, external_id, stakeholder_key) in rows {
            ids.insert(identity_key(&stakeholder_key, &external_id), id);
        }
    }
    Ok(ids)
}

pub(crate) async fn upsert_sinks(
    tx: &mut DbTx<'_>,
    sinks: &[Sink],
) -> Result<HashMap<IdentityKey, Uuid>, Error> {
    let mut ids = HashMap::with_capacity(sinks.len());
    for batch in sinks.chunks(BATCH_SIZE) {
        let rows = upsert_endpoint_batch(tx, batch, Endpoint::Sink).await?;
        for (id, external_id, stakeholder_key) in rows {
            ids.insert(identity_key(&stakeholder_key, &external_id), id);
        }
    }
    Ok(ids)
}

enum Endpoint {
    Source,
    Sink,
}

impl Endpoint {
    fn table(&self) -> &'static str {
        match self {
            Endpoint::Source => "structure_source",
            Endpoint::Sink => "structure_sink",
        }
    }

    fn id_column(&self) -> &'static str {
        match self {
            Endpoint::Source => "source_id",
            Endpoint::Sink => "sink_id",
        }
    }
}

trait EndpointFields {
    fn external_id(&self) -> &str;
    fn stakeholder_key(&self) -> &str;
    fn name(&self) -> &str;
    fn type_str(&self) -> String;
    fn visible(&self) -> bool;
    fn display_path(&self) -> &str;
    fn adapter_key(&self) -> &str;
    fn wire_id(&self) -> &str;
    fn ref_key(&self) -> Option<&str>;
    fn ref_id(&self) -> Option<&str>;
    fn meta_data(&self) -> Option<&serde_json::Value>;
    fn preset_filters(&self) -> &HashMap<String, serde_json::Value>;
    fn passthrough_filters(&self) -> &[structure_models::Filter];
    fn thing_node_external_ids(&self) -> &[String];
}

impl EndpointFields for Source {
    fn external_id(&self) -> &str {
        &self.external_id
    }
    fn stakeholder_key(&self) -> &str {
        &self.stakeholder_key
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn type_str(&self) -> String {
        self.type_.to_string()
    }
    fn visible(&self) -> bool {
        self.visible
    }
    fn display_path(&self) -> &str {
        &self.display_path
    }
    fn adapter_key(&self) -> &str {
        &self.adapter_key
    }
    fn wire_id(&self) -> &str {
        &self.source_id
    }
    fn ref_key(&self) -> Option<&str> {
        self.ref_key.as_deref()
    }
    fn ref_id(&self) -> Option<&str> {
        self.ref_id.as_deref()
    }
    fn meta_data(&self) -> Option<&serde_json::Value> {
        self.meta_data.as_ref()
    }
    fn preset_filters(&self) -> &HashMap<String, serde_json::Value> {
        &self.preset_filters
    }
    fn passthrough_filters(&self) -> &[structure_models::Filter] {
        &self.passthrough_filters
    }
    fn thing_node_external_ids(&self) -> &[String] {
        &self.thing_node_external_ids
    }
}

impl EndpointFields for Sink {
    fn external_id(&self) -> &str {
        &self.external_id
    }
    fn stakeholder_key(&self) -> &str {
        &self.stakeholder_key
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn type_str(&self) -> String {
        self.type_.to_string()
    }
    fn visible(&self) -> bool {
        self.visible
    }
    fn display_path(&self) -> &str {
        &self.display_path
    }
    fn adapter_key(&self) -> &str {
        &self.adapter_key
    }
    fn wire_id(&self) -> &str {
        &self.sink_id
    }
    fn ref_key(&self) -> Option<&str> {
        self.ref_key.as_deref()
    }
    fn ref_id(&self) -> Option<&str> {
        self.ref_id.as_deref()
    }
    fn meta_data(&self) -> Option<&serde_json::Value> {
        self.meta_data.as_ref()
    }
    fn preset_filters(&self) -> &HashMap<String, serde_json::Value> {
        &self.preset_filters
    }
    fn passthrough_filters(&self) -> &[structure_models::Filter] {
        &self.passthrough_filters
    }
    fn thing_node_external_ids(&self) -> &[String] {
        &self.thing_node_external_ids
    }
}

async fn upsert_endpoint_batch<T: EndpointFields>(
    tx: &mut DbTx<'_>,
    batch: &[T],
    endpoint: Endpoint,
) -> Result<Vec<(Uuid, String, String)>, Error> {
    let table = endpoint.table();
    let id_column = endpoint.id_column();
    match tx {
        DbTx::Postgres(tx) => {
            let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
                "insert into {table} \
                 (id, external_id, stakeholder_key, name, type, visible, display_path, \
                  adapter_key, {id_column}, ref_key, ref_id, meta_data, preset_filters, \
                  passthrough_filters, thing_node_external_ids) "
            ));
            qb.push_values(batch, |mut b, item| {
                b.push_bind(Uuid::new_v4())
                    .push_bind(item.external_id().to_string())
                    .push_bind(item.stakeholder_key().to_string())
                    .push_bind(item.name().to_string())
                    .push_bind(item.type_str())
                    .push_bind(item.visible())
                    .push_bind(item.display_path().to_string())
                    .push_bind(item.adapter_key().to_string())
                    .push_bind(item.wire_id().to_string())
                    .push_bind(item.ref_key().map(|s| s.to_string()))
                    .push_bind(item.ref_id().map(|s| s.to_string()))
                    .push_bind(item.meta_data().cloned())
                    .push_bind(sqlx::types::Json(item.preset_filters()))
                    .push_bind(sqlx::types::Json(item.passthrough_filters()))
                    .push_bind(sqlx::types::Json(item.thing_node_external_ids()));
            });
            qb.push(format!(
                " on conflict (external_id, stakeholder_key) do update set \
                  name = excluded.name, type = excluded.type, visible = excluded.visible, \
                  display_path = excluded.display_path, adapter_key = excluded.adapter_key, \
                  {id_column} = excluded.{id_column}, ref_key = excluded.ref_key, \
                  ref_id = excluded.ref_id, meta_data = excluded.meta_data, \
                  preset_filters = excluded.preset_filters, \
                  passthrough_filters = excluded.passthrough_filters, \
                  thing_node_external_ids = excluded.thing_node_external_ids \
                  returning id, external_id, stakeholder_key"
            ));
            qb.build_query_as::<(Uuid, String, String)>()
                .fetch_all(&mut **tx)
                .await
                .map_err(classify_write_error)
        }
        DbTx::Sqlite(tx) => {
            let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(format!(
                "insert into {table} \
                 (id, external_id, stakeholder_key, name, type, visible, display_path, \
                  adapter_key, {id_column}, ref_key, ref_id, meta_data, preset_filters, \
                  passthrough_filters, thing_node_external_ids) "
            ));
            qb.push_values(batch, |mut b, item| {
                b.push_bind(Uuid::new_v4())
                    .push_bind(item.external_id().to_string())
                    .push_bind(item.stakeholder_key().to_string())
                    .push_bind(item.name().to_string())
                    .push_bind(item.type_str())
                    .push_bind(item.visible())
                    .push_bind(item.display_path().to_string())
                    .push_bind(item.adapter_key().to_string())
                    .push_bind(item.wire_id().to_string())
                    .push_bind(item.ref_key().map(|s| s.to_string()))
                    .push_bind(item.ref_id().map(|s| s.to_string()))
                    .push_bind(item.meta_data().cloned())
                    .push_bind(sqlx::types::Json(item.preset_filters()))
                    .push_bind(sqlx::types::Json(item.passthrough_filters()))
                    .push_bind(sqlx::types::Json(item.thing_node_external_ids()));
            });
            qb.push(format!(
                " on conflict (external_id, stakeholder_key) do update set \
                  name = excluded.name, type = excluded.type, visible = excluded.visible, \
                  display_path = excluded.display_path, adapter_key = excluded.adapter_key, \
                  {id_column} = excluded.{id_column}, ref_key = excluded.ref_key, \
                  ref_id = excluded.ref_id, meta_data = excluded.meta_data, \
                  preset_filters = excluded.preset_filters, \
                  passthrough_filters = excluded.passthrough_filters, \
                  thing_node_external_ids = excluded.thing_node_external_ids \
                  returning id, external_id, stakeholder_key"
            ));
            qb.build_query_as::<(Uuid, String, String)>()
                .fetch_all(&mut **tx)
                .await
                .map_err(classify_write_error)
        }
    }
}

/// Rebuilds the thing-node/source and thing-node/sink association tables for
/// a freshly upserted batch of endpoints, wholesale: existing rows for these
/// endpoint ids are deleted first, then re-inserted from the document's
/// current `thing_node_external_ids` lists.
pub(crate) async fn rebuild_source_associations(
    tx: &mut DbTx<'_>,
    sources: &[Source],
    source_ids: &HashMap<IdentityKey, Uuid>,
    thing_node_ids: &HashMap<IdentityKey, Uuid>,
) -> Result<(), Error> {
    rebuild_associations(
        tx,
        "structure_thingnode_source_association",
        "source_id",
        sources.iter().map(|s| {
            (
                identity_key(&s.stakeholder_key, &s.external_id),
                s.stakeholder_key.as_str(),
                &s.thing_node_external_ids,
            )
        }),
        source_ids,
        thing_node_ids,
    )
    .await
}

pub(crate) async fn rebuild_sink_associations(
    tx: &mut DbTx<'_>,
    sinks: &[Sink],
    sink_ids: &HashMap<IdentityKey, Uuid>,
    thing_node_ids: &HashMap<IdentityKey, Uuid>,
) -> Result<(), Error> {
    rebuild_associations(
        tx,
        "structure_thingnode_sink_association",
        "sink_id",
        sinks.iter().map(|s| {
            (
                identity_key(&s.stakeholder_key, &s.external_id),
                s.stakeholder_key.as_str(),
                &s.thing_node_external_ids,
            )
        }),
        sink_ids,
        thing_node_ids,
    )
    .await
}

async fn rebuild_associations<'a>(
    tx: &mut DbTx<'_>,
    table: &'static str,
    endpoint_column: &'static str,
    endpoints: impl Iterator<Item = (IdentityKey, &'a str, &'a Vec<String>)>,
    endpoint_ids: &HashMap<IdentityKey, Uuid>,
    thing_node_ids: &HashMap<IdentityKey, Uuid>,
) -> Result<(), Error> {
    let mut pairs = Vec::new();
    for (key, stakeholder_key, thing_node_external_ids) in endpoints {
        let Some(&endpoint_id) = endpoint_ids.get(&key) else {
            return Err(Error::Association(format!(
                "endpoint '{}' was not assigned an id during upsert",
                key.1
            )));
        };
        for thing_node_external_id in thing_node_external_ids {
            let thing_node_key = identity_key(stakeholder_key, thing_node_external_id);
            // Whole-document validation already rejects a thing_node_external_ids
            // entry that doesn't name a thing_node in the document, so this
            // miss should never fire in practice. Drop it silently rather
            // than fail the whole association rebuild over it.
            let Some(&thing_node_id) = thing_node_ids.get(&thing_node_key) else {
                tracing::warn!(
                    endpoint = key.1,
                    thing_node = thing_node_external_id,
                    "dropping endpoint-to-thing_node association: thing_node was not assigned an id during upsert"
                );
                continue;
            };
            pairs.push((thing_node_id, endpoint_id));
        }
    }

    match tx {
        DbTx::Postgres(tx) => {
            let endpoint_ids_in_batch: Vec<Uuid> = endpoint_ids
                .values()
                .copied()
                .collect::<std::collections::HashSet<_>>()
                .into_iter()
                .collect();
            sqlx::query(&format!(
                "delete from {table} where {endpoint_column} = any($1)"
            ))
            .bind(&endpoint_ids_in_batch)
            .execute(&mut **tx)
            .await
            .map_err(classify_write_error)?;

            if !pairs.is_empty() {
                let mut qb: QueryBuilder<sqlx::Postgres> =
                    QueryBuilder::new(format!("insert into {table} (thingnode_id, {endpoint_column}) "));
                qb.push_values(&pairs, |mut b, (thing_node_id, endpoint_id)| {
                    b.push_bind(thing_node_id).push_bind(endpoint_id);
                });
                qb.build().execute(&mut **tx).await.map_err(classify_write_error)?;
            }
        }
        DbTx::Sqlite(tx) => {
            for &endpoint_id in endpoint_ids.values() {
                sqlx::query(&format!("delete from {table} where {endpoint_column} = ?"))
                    .bind(endpoint_id)
                    .execute(&mut **tx)
                    .await
                    .map_err(classify_write_error)?;
            }
            if !pairs.is_empty() {
                let mut qb: QueryBuilder<sqlx::Sqlite> =
                    QueryBuilder::new(format!("insert into {table} (thingnode_id, {endpoint_column}) "));
                qb.push_values(&pairs, |mut b, (thing_node_id, endpoint_id)| {
                    b.push_bind(thing_node_id).push_bind(endpoint_id);
                });
                qb.build().execute(&mut **tx).await.map_err(classify_write_error)?;
            }
        }
    }
    Ok(())
}
