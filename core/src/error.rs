use thiserror::Error;

/// Failure of a single title fetch. Absorbed by the probe retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("could not resolve host {0}")]
    Dns(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("timed out after {0} ms")]
    Timeout(u64),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Body(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("storage handle lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Backend(err.into())
    }
}
