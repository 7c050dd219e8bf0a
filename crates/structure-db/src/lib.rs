//! Dialect-aware persistence for the virtual structure catalog.
//!
//! Every public operation takes a [`DbPool`], the crate's single
//! dialect-aware type, and dispatches to PostgreSQL or SQLite once at the
//! top of the call. Everything downstream of that dispatch (row shapes,
//! upsert semantics, hierarchy ordering) is backend-agnostic.

mod delete;
mod error;
mod fetch;
mod hierarchy;
mod pool;
mod rows;
mod upsert;

use std::collections::HashMap;

use structure_models::{CompleteStructure, ElementType, Sink, Source, ThingNode};
use uuid::Uuid;

pub use error::Error;
pub use hierarchy::sort_thing_nodes_by_external_key;
pub use pool::DbPool;

/// Persistence façade over a [`DbPool`]. Cheap to clone: the underlying pool
/// is itself a handle to a connection pool.
#[derive(Clone)]
pub struct Db {
    pool: DbPool,
}

impl Db {
    pub fn new(pool: DbPool) -> Self {
        Db { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Idempotently bulk-upserts a whole validated structure. Entities are
    /// keyed on `(external_id, stakeholder_key)`; internal ids are preserved
    /// across re-imports. Element types are written first, then thing nodes
    /// (with a second pass to rewrite parent pointers once every node in the
    /// batch has an id), then sources and sinks and their associations.
    ///
    /// The whole sequence runs inside one transaction: commits on success,
    /// rolls back on any failure (including on drop, if a future is
    /// cancelled partway through).
    pub async fn upsert_structure(&self, structure: &CompleteStructure) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        let element_type_ids =
            upsert::upsert_element_types(&mut tx, &structure.element_types).await?;
        let sorted_thing_nodes =
            hierarchy::sort_thing_nodes_by_external_key(structure.thing_nodes.clone());
        let thing_node_ids =
            upsert::upsert_thing_nodes(&mut tx, &sorted_thing_nodes, &element_type_ids).await?;
        let source_ids = upsert::upsert_sources(&mut tx, &structure.sources).await?;
        let sink_ids = upsert::upsert_sinks(&mut tx, &structure.sinks).await?;
        upsert::rebuild_source_associations(
            &mut tx,
            &structure.sources,
            &source_ids,
            &thing_node_ids,
        )
        .await?;
        upsert::rebuild_sink_associations(&mut tx, &structure.sinks, &sink_ids, &thing_node_ids)
            .await?;

        tx.commit().await
    }

    /// Wipes every table owned by the virtual structure catalog.
    pub async fn delete_structure(&self) -> Result<(), Error> {
        delete::delete_structure(&self.pool).await
    }

    /// `true` once at least one thing node has ever been written, used by
    /// the prepopulation driver to decide whether this is a first run.
    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(!fetch::any_thing_nodes_exist(&self.pool).await?)
    }

    /// Returns the full hierarchy in breadth-first order, roots first.
    pub async fn hierarchy(&self) -> Result<Vec<ThingNode>, Error> {
        let nodes = fetch::fetch_all_thing_nodes(&self.pool).await?;
        Ok(hierarchy::bfs_sort(nodes))
    }

    /// Direct children of `parent_id`, or the roots when `parent_id` is
    /// `None`.
    pub async fn children_of(&self, parent_id: Option<Uuid>) -> Result<Vec<ThingNode>, Error> {
        fetch::fetch_children_of(&self.pool, parent_id).await
    }

    pub async fn thing_node_by_id(&self, id: Uuid) -> Result<Option<ThingNode>, Error> {
        fetch::fetch_thing_node_by_id(&self.pool, id).await
    }

    pub async fn element_types_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ElementType>, Error> {
        let types = fetch::fetch_element_types_by_ids(&self.pool, ids).await?;
        Ok(types
            .into_iter()
            .filter_map(|et| et.id.map(|id| (id, et)))
            .collect())
    }

    pub async fn source_by_id(&self, id: Uuid) -> Result<Option<Source>, Error> {
        fetch::fetch_source_by_id(&self.pool, id).await
    }

    pub async fn sink_by_id(&self, id: Uuid) -> Result<Option<Sink>, Error> {
        fetch::fetch_sink_by_id(&self.pool, id).await
    }

    pub async fn sources_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Source>, Error> {
        let sources = fetch::fetch_sources_by_ids(&self.pool, ids).await?;
        Ok(sources.into_iter().filter_map(|s| s.id.map(|id| (id, s))).collect())
    }

    pub async fn sinks_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Sink>, Error> {
        let sinks = fetch::fetch_sinks_by_ids(&self.pool, ids).await?;
        Ok(sinks.into_iter().filter_map(|s| s.id.map(|id| (id, s))).collect())
    }

    pub async fn search_sources(&self, filter: &str) -> Result<Vec<Source>, Error> {
        fetch::search_sources(&self.pool, filter).await
    }

    pub async fn search_sinks(&self, filter: &str) -> Result<Vec<Sink>, Error> {
        fetch::search_sinks(&self.pool, filter).await
    }

    pub async fn sources_for_thing_node(&self, thing_node_id: Uuid) -> Result<Vec<Source>, Error> {
        fetch::fetch_sources_for_thing_node(&self.pool, thing_node_id).await
    }

    pub async fn sinks_for_thing_node(&self, thing_node_id: Uuid) -> Result<Vec<Sink>, Error> {
        fetch::fetch_sinks_for_thing_node(&self.pool, thing_node_id).await
    }

    /// Thing node ids a source is attached to. Empty if the source has no
    /// associations (possible if it was imported without any).
    pub async fn thing_node_ids_for_source(&self, source_id: Uuid) -> Result<Vec<Uuid>, Error> {
        fetch::fetch_thing_node_ids_for_source(&self.pool, source_id).await
    }

    pub async fn thing_node_ids_for_sink(&self, sink_id: Uuid) -> Result<Vec<Uuid>, Error> {
        fetch::fetch_thing_node_ids_for_sink(&self.pool, sink_id).await
    }
}
