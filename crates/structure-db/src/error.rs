/// Error taxonomy surfaced by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("failed to rebuild thing-node association: {0}")]
    Association(String),
    #[error("database update failed: {0}")]
    Update(#[source] sqlx::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Classifies a write failure as an [`Error::Integrity`] violation when the
/// driver reports a unique or foreign-key constraint failure, and as a
/// catch-all [`Error::Update`] otherwise. The only place a raw
/// `sqlx::Error` is inspected for its database-specific cause.
pub(crate) fn classify_write_error(err: sqlx::Error) -> Error {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            return Error::Integrity(db_err.message().to_string());
        }
    }
    Error::Update(err)
}
