use kurteyt_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

/// Unexpected failures while resolving a request.
///
/// A missing record is not one of them: it resolves to the expired
/// redirect.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
    #[error("failed to render interstitial page: {0}")]
    Render(
        #[from]
        #[source]
        askama::Error,
    ),
    #[error("unsupported redirect status: {0}")]
    UnsupportedStatus(u16),
}
