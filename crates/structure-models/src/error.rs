/// The JSON document could not be parsed as a [`crate::CompleteStructure`].
#[derive(Debug, thiserror::Error)]
#[error("failed to parse structure document: {0}")]
pub struct ParseError(#[from] pub serde_json::Error);

/// The document parsed, but violates one of the catalog's structural or
/// referential invariants. The message names the invariant and the
/// offending entity so tests can assert on substrings.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
