use crate::Error;
use std::time::Duration;

/// The only dialect-aware type in the crate: a connection pool bound to one
/// of the two supported backends. Every other module matches on this enum
/// exactly once, at the top of each public operation, and shares row-level
/// logic below that point.
#[derive(Clone)]
pub enum DbPool {
    Postgres(sqlx::PgPool),
    Sqlite(sqlx::SqlitePool),
}

static POSTGRES_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("migrations/postgres");
static SQLITE_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("migrations/sqlite");

impl DbPool {
    /// Connects to a PostgreSQL database at `database_url` and runs
    /// migrations.
    pub async fn connect_postgres(database_url: &str) -> Result<Self, Error> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(Error::Connection)?;
        POSTGRES_MIGRATOR.run(&pool).await?;
        Ok(DbPool::Postgres(pool))
    }

    /// Opens (creating if absent) a SQLite database file at `path` and runs
    /// migrations.
    pub async fn connect_sqlite(path: &str) -> Result<Self, Error> {
        let options = sqlx::sqlite::SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(Error::Connection)?;
        SQLITE_MIGRATOR.run(&pool).await?;
        Ok(DbPool::Sqlite(pool))
    }

    pub fn dialect_name(&self) -> &'static str {
        match self {
            DbPool::Postgres(_) => "postgres",
            DbPool::Sqlite(_) => "sqlite",
        }
    }

    /// Begins a dialect-matched transaction. `update_structure` and
    /// `delete_structure` each run their whole sequence of statements inside
    /// one of these: commit on success, rollback (via drop) on any error.
    pub(crate) async fn begin(&self) -> Result<DbTx<'_>, Error> {
        match self {
            DbPool::Postgres(pg) => Ok(DbTx::Postgres(pg.begin().await.map_err(Error::Connection)?)),
            DbPool::Sqlite(sq) => Ok(DbTx::Sqlite(sq.begin().await.map_err(Error::Connection)?)),
        }
    }
}

/// A transaction bound to one of the two supported backends. Mirrors
/// [`DbPool`]'s role as the crate's single dialect-aware type, but for the
/// statement sequences that must commit or roll back together.
pub(crate) enum DbTx<'a> {
    Postgres(sqlx::Transaction<'a, sqlx::Postgres>),
    Sqlite(sqlx::Transaction<'a, sqlx::Sqlite>),
}

impl<'a> DbTx<'a> {
    pub(crate) async fn commit(self) -> Result<(), Error> {
        match self {
            DbTx::Postgres(tx) => tx.commit().await.map_err(Error::Connection),
            DbTx::Sqlite(tx) => tx.commit().await.map_err(Error::Connection),
        }
    }
}
