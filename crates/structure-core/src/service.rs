use structure_db::Db;
use structure_models::{CompleteStructure, Sink, Source, ThingNode};
use uuid::Uuid;

use crate::Error;

/// The public façade of the subsystem: orchestrates document validation,
/// hierarchy ordering, and persistence behind load/update/delete/browse
/// operations. Holds nothing but a handle to the persistence layer — no
/// in-memory cache of the catalog is kept, so every read goes to the
/// database.
#[derive(Clone)]
pub struct StructureService {
    db: Db,
}

impl StructureService {
    pub fn new(db: Db) -> Self {
        StructureService { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Reads, parses, and validates a structure document from disk. Fails
    /// with an I/O error if the path cannot be read, a parse error if the
    /// contents are not well-formed JSON, or a validation error if any
    /// document invariant is violated.
    pub async fn load_from_json_file(&self, path: &str) -> Result<CompleteStructure, Error> {
        let raw = tokio::fs::read_to_string(path).await?;
        let structure = CompleteStructure::from_json(&raw)?;
        structure.validate()?;
        Ok(structure)
    }

    /// Upserts everything present in `structure`. Does not delete entities
    /// absent from the document — callers wanting a clean slate must call
    /// [`Self::delete_structure`] first.
    pub async fn update_structure(&self, structure: &CompleteStructure) -> Result<(), Error> {
        structure.validate()?;
        tracing::info!(
            element_types = structure.element_types.len(),
            thing_nodes = structure.thing_nodes.len(),
            sources = structure.sources.len(),
            sinks = structure.sinks.len(),
            "upserting structure"
        );
        self.db.upsert_structure(structure).await?;
        Ok(())
    }

    pub async fn delete_structure(&self) -> Result<(), Error> {
        tracing::info!("deleting existing structure");
        self.db.delete_structure().await?;
        Ok(())
    }

    pub async fn are_structure_tables_empty(&self) -> Result<bool, Error> {
        Ok(self.db.is_empty().await?)
    }

    /// Children of `parent_id`, or the roots (with empty sources/sinks)
    /// when `parent_id` is absent.
    pub async fn get_children(
        &self,
        parent_id: Option<Uuid>,
    ) -> Result<(Vec<ThingNode>, Vec<Source>, Vec<Sink>), Error> {
        match parent_id {
            None => {
                let roots = self.db.children_of(None).await?;
                Ok((roots, Vec::new(), Vec::new()))
            }
            Some(id) => {
                if self.db.thing_node_by_id(id).await?.is_none() {
                    return Err(Error::NotFound(format!("thing_node '{id}'")));
                }
                let children = self.db.children_of(Some(id)).await?;
                let sources = self.db.sources_for_thing_node(id).await?;
                let sinks = self.db.sinks_for_thing_node(id).await?;
                Ok((children, sources, sinks))
            }
        }
    }
}
