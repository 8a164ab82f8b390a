use kurteyt_core::{CoreError, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortUrlError>;

/// Failures of the short URL service.
///
/// The display text of the store-side variants is a fixed message that is
/// safe to hand to clients; the wrapped detail is only meant for logs.
#[derive(Debug, Clone, Error)]
pub enum ShortUrlError {
    #[error("Record not found")]
    NotFound(String),
    #[error("Failed to create record")]
    CreateFailed(String),
    #[error("Failed to create record with condition")]
    CreateConditionFailed(String),
    #[error("Failed to get record")]
    GetFailed(String),
    #[error("Failed to update record")]
    UpdateFailed(String),
    #[error("Failed to delete record")]
    DeleteFailed(String),
    #[error("Scan failed")]
    ScanFailed(String),
    #[error("Couldnt be converted to json")]
    ConvertFailed(String),
    #[error("Failed to connect to database record")]
    DatabaseConnectionError(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("Pagination cursor is invalid")]
    InvalidCursor(String),
}

impl ShortUrlError {
    /// Wraps a store failure, routing the connection and conversion cases to
    /// their own variants and everything else to `fallback`.
    pub(crate) fn from_storage(err: StorageError, fallback: fn(String) -> Self) -> Self {
        let detail = err.to_string();
        match err {
            StorageError::Unavailable(_) | StorageError::Timeout(_) => {
                Self::DatabaseConnectionError(detail)
            }
            StorageError::Conversion(_) => Self::ConvertFailed(detail),
            _ => fallback(detail),
        }
    }

    /// The detail behind the public message.
    pub fn detail(&self) -> &str {
        match self {
            Self::NotFound(detail)
            | Self::CreateFailed(detail)
            | Self::CreateConditionFailed(detail)
            | Self::GetFailed(detail)
            | Self::UpdateFailed(detail)
            | Self::DeleteFailed(detail)
            | Self::ScanFailed(detail)
            | Self::ConvertFailed(detail)
            | Self::DatabaseConnectionError(detail)
            | Self::InvalidUrl(detail)
            | Self::InvalidRequest(detail)
            | Self::InvalidCursor(detail) => detail,
        }
    }
}

impl From<CoreError> for ShortUrlError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidShortId(message) => Self::InvalidRequest(message),
            CoreError::InvalidExpiry(message) => Self::InvalidRequest(message),
            CoreError::InvalidCursor(message) => Self::InvalidCursor(message),
        }
    }
}
