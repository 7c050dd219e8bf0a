use structure_models::{ElementType, Sink, Source, ThingNode};
use uuid::Uuid;

use crate::error::classify_write_error;
use crate::pool::DbPool;
use crate::rows::{ElementTypeRow, SinkRow, SourceRow, ThingNodeRow};
use crate::Error;

/// Maximum ids bound into a single `IN (...)` lookup list, matched to
/// [`crate::upsert::BATCH_SIZE`] so a full-document round trip never exceeds
/// either backend's bind-parameter ceiling.
const LOOKUP_BATCH_SIZE: usize = 500;

pub async fn fetch_all_thing_nodes(pool: &DbPool) -> Result<Vec<ThingNode>, Error> {
    let rows = match pool {
        DbPool::Postgres(pg) => {
            sqlx::query_as::<_, ThingNodeRow>("select * from structure_thing_node")
                .fetch_all(pg)
                .await
                .map_err(classify_write_error)?
        }
        DbPool::Sqlite(sq) => {
            sqlx::query_as::<_, ThingNodeRow>("select * from structure_thing_node")
                .fetch_all(sq)
                .await
                .map_err(classify_write_error)?
        }
    };
    Ok(rows.into_iter().map(ThingNode::from).collect())
}

pub async fn fetch_thing_node_by_id(pool: &DbPool, id: Uuid) -> Result<Option<ThingNode>, Error> {
    let row = match pool {
        DbPool::Postgres(pg) => {
            sqlx::query_as::<_, ThingNodeRow>("select * from structure_thing_node where id = $1")
                .bind(id)
                .fetch_optional(pg)
                .await
                .map_err(classify_write_error)?
        }
        DbPool::Sqlite(sq) => {
            sqlx::query_as::<_, ThingNodeRow>("select * from structure_thing_node where id = ?")
                .bind(id)
                .fetch_optional(sq)
                .await
                .map_err(classify_write_error)?
        }
    };
    Ok(row.map(ThingNode::from))
}

pub async fn fetch_children_of(
    pool: &DbPool,
    parent_id: Option<Uuid>,
) -> Result<Vec<ThingNode>, Error> {
    let rows = match (pool, parent_id) {
        (DbPool::Postgres(pg), Some(parent_id)) => {
            sqlx::query_as::<_, ThingNodeRow>(
                "select * from structure_thing_node where parent_node_id = $1",
            )
            .bind(parent_id)
            .fetch_all(pg)
            .await
            .map_err(classify_write_error)?
        }
        (DbPool::Postgres(pg), None) => sqlx::query_as::<_, ThingNodeRow>(
            "select * from structure_thing_node where parent_node_id is null",
        )
        .fetch_all(pg)
        .await
        .map_err(classify_write_error)?,
        (DbPool::Sqlite(sq), Some(parent_id)) => sqlx::query_as::<_, ThingNodeRow>(
            "select * from structure_thing_node where parent_node_id = ?",
        )
        .bind(parent_id)
        .fetch_all(sq)
        .await
        .map_err(classify_write_error)?,
        (DbPool::Sqlite(sq), None) => sqlx::query_as::<_, ThingNodeRow>(
            "select * from structure_thing_node where parent_node_id is null",
        )
        .fetch_all(sq)
        .await
        .map_err(classify_write_error)?,
    };
    Ok(rows.into_iter().map(ThingNode::from).collect())
}

pub async fn fetch_element_types_by_ids(
    pool: &DbPool,
    ids: &[Uuid],
) -> Result<Vec<ElementType>, Error> {
    let mut out = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(LOOKUP_BATCH_SIZE) {
        let rows = match pool {
            DbPool::Postgres(pg) => {
                sqlx::query_as::<_, ElementTypeRow>(
                    "select * from structure_element_type where id = any($1)",
                )
                .bind(chunk)
                .fetch_all(pg)
                .await
                .map_err(classify_write_error)?
            }
            DbPool::Sqlite(sq) => {
                let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> =
                    sqlx::QueryBuilder::new("select * from structure_element_type where id in (");
                let mut separated = qb.separated(", ");
                for id in chunk {
                    separated.push_bind(id);
                }
                separated.push_unseparated(")");
                qb.build_query_as::<ElementTypeRow>()
                    .fetch_all(sq)
                    .await
                    .map_err(classify_write_error)?
            }
        };
        out.extend(rows.into_iter().map(ElementType::from));
    }
    Ok(out)
}

pub async fn fetch_sources_by_ids(pool: &DbPool, ids: &[Uuid]) -> Result<Vec<Source>, Error> {
    let mut out = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(LOOKUP_BATCH_SIZE) {
        let rows = match pool {
            DbPool::Postgres(pg) => {
                sqlx::query_as::<_, SourceRow>("select * from structure_source where id = any($1)")
                    .bind(chunk)
                    .fetch_all(pg)
                    .await
                    .map_err(classify_write_error)?
            }
            DbPool::Sqlite(sq) => {
                let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> =
                    sqlx::QueryBuilder::new("select * from structure_source where id in (");
                let mut separated = qb.separated(", ");
                for id in chunk {
                    separated.push_bind(id);
                }
                separated.push_unseparated(")");
                qb.build_query_as::<SourceRow>()
                    .fetch_all(sq)
                    .await
                    .map_err(classify_write_error)?
            }
        };
        for row in rows {
            out.push(Source::try_from(row).map_err(Error::Integrity)?);
        }
    }
    Ok(out)
}

pub async fn fetch_sinks_by_ids(pool: &DbPool, ids: &[Uuid]) -> Result<Vec<Sink>, Error> {
    let mut out = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(LOOKUP_BATCH_SIZE) {
        let rows = match pool {
            DbPool::Postgres(pg) => {
                sqlx::query_as::<_, SinkRow>("select * from structure_sink where id = any($1)")
                    .bind(chunk)
                    .fetch_all(pg)
                    .await
                    .map_err(classify_write_error)?
            }
            DbPool::Sqlite(sq) => {
                let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> =
                    sqlx::QueryBuilder::new("select * from structure_sink where id in (");
                let mut separated = qb.separated(", ");
                for id in chunk {
                    separated.push_bind(id);
                }
                separated.push_unseparated(")");
                qb.build_query_as::<SinkRow>()
                    .fetch_all(sq)
                    .await
                    .map_err(classify_write_error)?
            }
        };
        for row in rows {
            out.push(Sink::try_from(row).map_err(Error::Integrity)?);
        }
    }
    Ok(out)
}

pub async fn fetch_source_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Source>, Error> {
    let row = match pool {
        DbPool::Postgres(pg) => {
            sqlx::query_as::<_, SourceRow>("select * from structure_source where id = $1")
                .bind(id)
                .fetch_optional(pg)
                .await
                .map_err(classify_write_error)?
        }
        DbPool::Sqlite(sq) => {
            sqlx::query_as::<_, SourceRow>("select * from structure_source where id = ?")
                .bind(id)
                .fetch_optional(sq)
                .await
                .map_err(classify_write_error)?
        }
    };
    row.map(Source::try_from)
        .transpose()
        .map_err(Error::Integrity)
}

pub async fn fetch_sink_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Sink>, Error> {
    let row = match pool {
        DbPool::Postgres(pg) => {
            sqlx::query_as::<_, SinkRow>("select * from structure_sink where id = $1")
                .bind(id)
                .fetch_optional(pg)
                .await
                .map_err(classify_write_error)?
        }
        DbPool::Sqlite(sq) => {
            sqlx::query_as::<_, SinkRow>("select * from structure_sink where id = ?")
                .bind(id)
                .fetch_optional(sq)
                .await
                .map_err(classify_write_error)?
        }
    };
    row.map(Sink::try_from).transpose().map_err(Error::Integrity)
}

/// Case-insensitive substring search over source names, matching the
/// adapter frontend's free-text `filter` query parameter.
pub async fn search_sources(pool: &DbPool, filter: &str) -> Result<Vec<Source>, Error> {
    let pattern = format!("%{}%", filter.to_lowercase());
    let rows = match pool {
        DbPool::Postgres(pg) => sqlx::query_as::<_, SourceRow>(
            "select * from structure_source where lower(name) like $1 order by name",
        )
        .bind(&pattern)
        .fetch_all(pg)
        .await
        .map_err(classify_write_error)?,
        DbPool::Sqlite(sq) => sqlx::query_as::<_, SourceRow>(
            "select * from structure_source where lower(name) like ? order by name",
        )
        .bind(&pattern)
        .fetch_all(sq)
        .await
        .map_err(classify_write_error)?,
    };
    rows.into_iter()
        .map(Source::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::Integrity)
}

pub async fn search_sinks(pool: &DbPool, filter: &str) -> Result<Vec<Sink>, Error> {
    let pattern = format!("%{}%", filter.to_lowercase());
    let rows = match pool {
        DbPool::Postgres(pg) => sqlx::query_as::<_, SinkRow>(
            "select * from structure_sink where lower(name) like $1 order by name",
        )
        .bind(&pattern)
        .fetch_all(pg)
        .await
        .map_err(classify_write_error)?,
        DbPool::Sqlite(sq) => sqlx::query_as::<_, SinkRow>(
            "select * from structure_sink where lower(name) like ? order by name",
        )
        .bind(&pattern)
        .fetch_all(sq)
        .await
        .map_err(classify_write_error)?,
    };
    rows.into_iter()
        .map(Sink::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::Integrity)
}

pub async fn fetch_sources_for_thing_node(
    pool: &DbPool,
    thing_node_id: Uuid,
) -> Result<Vec<Source>, Error> {
    let rows = match pool {
        DbPool::Postgres(pg) => sqlx::query_as::<_, SourceRow>(
            "select s.* from structure_source s \
             inner join structure_thingnode_source_association a on a.source_id = s.id \
             where a.thingnode_id = $1",
        )
        .bind(thing_node_id)
        .fetch_all(pg)
        .await
        .map_err(classify_write_error)?,
        DbPool::Sqlite(sq) => sqlx::query_as::<_, SourceRow>(
            "select s.* from structure_source s \
             inner join structure_thingnode_source_association a on a.source_id = s.id \
             where a.thingnode_id = ?",
        )
        .bind(thing_node_id)
        .fetch_all(sq)
        .await
        .map_err(classify_write_error)?,
    };
    rows.into_iter()
        .map(Source::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::Integrity)
}

pub async fn fetch_sinks_for_thing_node(
    pool: &DbPool,
    thing_node_id: Uuid,
) -> Result<Vec<Sink>, Error> {
    let rows = match pool {
        DbPool::Postgres(pg) => sqlx::query_as::<_, SinkRow>(
            "select s.* from structure_sink s \
             inner join structure_thingnode_sink_association a on a.sink_id = s.id \
             where a.thingnode_id = $1",
        )
        .bind(thing_node_id)
        .fetch_all(pg)
        .await
        .map_err(classify_write_error)?,
        DbPool::Sqlite(sq) => sqlx::query_as::<_, SinkRow>(
            "select s.* from structure_sink s \
             inner join structure_thingnode_sink_association a on a.sink_id = s.id \
             where a.thingnode_id = ?",
        )
        .bind(thing_node_id)
        .fetch_all(sq)
        .await
        .map_err(classify_write_error)?,
    };
    rows.into_iter()
        .map(Sink::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::Integrity)
}

/// Thing node ids a source is attached to, in no particular order. Used by
/// the adapter frontend to pick a representative `thingNodeId` for a source
/// looked up outside the context of a specific parent.
pub async fn fetch_thing_node_ids_for_source(
    pool: &DbPool,
    source_id: Uuid,
) -> Result<Vec<Uuid>, Error> {
    match pool {
        DbPool::Postgres(pg) => {
            sqlx::query_scalar::<_, Uuid>(
                "select thingnode_id from structure_thingnode_source_association where source_id = $1",
            )
            .bind(source_id)
            .fetch_all(pg)
            .await
            .map_err(classify_write_error)
        }
        DbPool::Sqlite(sq) => {
            sqlx::query_scalar::<_, Uuid>(
                "select thingnode_id from structure_thingnode_source_association where source_id = ?",
            )
            .bind(source_id)
            .fetch_all(sq)
            .await
            .map_err(classify_write_error)
        }
    }
}

pub async fn fetch_thing_node_ids_for_sink(
    pool: &DbPool,
    sink_id: Uuid,
) -> Result<Vec<Uuid>, Error> {
    match pool {
        DbPool::Postgres(pg) => {
            sqlx::query_scalar::<_, Uuid>(
                "select thingnode_id from structure_thingnode_sink_association where sink_id = $1",
            )
            .bind(sink_id)
            .fetch_all(pg)
            .await
            .map_err(classify_write_error)
        }
        DbPool::Sqlite(sq) => {
            sqlx::query_scalar::<_, Uuid>(
                "select thingnode_id from structure_thingnode_sink_association where sink_id = ?",
            )
            .bind(sink_id)
            .fetch_all(sq)
            .await
            .map_err(classify_write_error)
        }
    }
}

pub async fn any_thing_nodes_exist(pool: &DbPool) -> Result<bool, Error> {
    let count: i64 = match pool {
        DbPool::Postgres(pg) => {
            sqlx::query_scalar("select count(*) from structure_thing_node")
                .fetch_one(pg)
                .await
                .map_err(classify_write_error)?
        }
        DbPool::Sqlite(sq) => {
            sqlx::query_scalar("select count(*) from structure_thing_node")
                .fetch_one(sq)
                .await
                .map_err(classify_write_error)?
        }
    };
    Ok(count > 0)
}
