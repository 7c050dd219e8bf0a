/// Error taxonomy surfaced by the structure service façade and the
/// prepopulation driver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read structure file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] structure_models::ParseError),
    #[error(transparent)]
    Validation(#[from] structure_models::ValidationError),
    #[error(transparent)]
    Db(#[from] structure_db::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid prepopulation configuration: {0}")]
    Config(String),
}
