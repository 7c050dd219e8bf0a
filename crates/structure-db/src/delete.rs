use crate::error::classify_write_error;
use crate::pool::DbPool;
use crate::Error;

/// Order matters: associations and children must go before the rows they
/// reference, to satisfy both backends' foreign key constraints without
/// relying on cascading deletes.
const TABLES_IN_DELETE_ORDER: &[&str] = &[
    "structure_thingnode_source_association",
    "structure_thingnode_sink_association",
    "structure_source",
    "structure_sink",
    "structure_thing_node",
    "structure_element_type",
];

/// Wipes the entire catalog. Used ahead of a full reload when the caller
/// asks to replace rather than merge the structure.
pub async fn delete_structure(pool: &DbPool) -> Result<(), Error> {
    match pool {
        DbPool::Postgres(pg) => {
            let mut tx = pg.begin().await.map_err(Error::Connection)?;
            for table in TABLES_IN_DELETE_ORDER {
                sqlx::query(&format!("delete from {table}"))
                    .execute(&mut *tx)
                    .await
                    .map_err(classify_write_error)?;
            }
            tx.commit().await.map_err(Error::Connection)?;
        }
        DbPool::Sqlite(sq) => {
            let mut tx = sq.begin().await.map_err(Error::Connection)?;
            for table in TABLES_IN_DELETE_ORDER {
                sqlx::query(&format!("delete from {table}"))
                    .execute(&mut *tx)
                    .await
                    .map_err(classify_write_error)?;
            }
            tx.commit().await.map_err(Error::Connection)?;
        }
    }
    Ok(())
}
