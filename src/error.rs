use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A collaborator fetch (listing, offer, quota, notification) rejected.
    /// The core never retries these; retry policy belongs to the fetcher.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// A listing record arrived without a usable resource identifier.
    /// Contract error: the operation aborts with no partial mutation.
    #[error("malformed resource record: {0}")]
    MalformedRecord(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an arbitrary collaborator failure as a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Error::Fetch(message.into())
    }
}
