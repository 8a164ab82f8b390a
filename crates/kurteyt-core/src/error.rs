use thiserror::Error;

/// Errors related to the core types of the URL shortener.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short id: {0}")]
    InvalidShortId(String),
    #[error("invalid expiry: {0}")]
    InvalidExpiry(String),
    #[error("invalid pagination cursor: {0}")]
    InvalidCursor(String),
}

/// Errors surfaced by record store backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("conditional write failed for key: {0}")]
    ConditionFailed(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("record conversion failed: {0}")]
    Conversion(String),
}
