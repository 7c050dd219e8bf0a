/// Error taxonomy surfaced by wiring resolution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A wiring referenced a source or sink UUID that persistence couldn't
    /// find. The exact wording matches what callers key their error
    /// handling on.
    #[error("Atleast one source or sink referenced in the wirings was not found")]
    AdapterHandling,
    #[error(transparent)]
    Db(#[from] structure_db::Error),
}
