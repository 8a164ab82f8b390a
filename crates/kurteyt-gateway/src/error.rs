use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kurteyt_redirector::ResolverError;
use kurteyt_shortener::ShortUrlError;
use serde_json::json;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Shortener(ShortUrlError),
    /// The edge resolver failed on a request it should have answered.
    Edge(ResolverError),
    /// The request body could not be read as JSON of the expected shape.
    InvalidBody(String),
    InvalidQuery(String),
    /// No route matched.
    RouteNotFound,
    Internal(String),
}

impl From<ShortUrlError> for AppError {
    fn from(value: ShortUrlError) -> Self {
        AppError::Shortener(value)
    }
}

impl From<ResolverError> for AppError {
    fn from(value: ResolverError) -> Self {
        AppError::Edge(value)
    }
}

impl AppError {
    /// Status and client-facing message. Inner error text only reaches the
    /// client for input validation failures.
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            AppError::Shortener(err) => match err {
                ShortUrlError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                ShortUrlError::InvalidUrl(_) | ShortUrlError::InvalidRequest(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                ShortUrlError::InvalidCursor(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            },
            AppError::InvalidBody(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail.clone()),
            AppError::InvalidQuery(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Edge(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        if status.is_server_error() {
            match &self {
                AppError::Shortener(err) => {
                    error!(error = %err, detail = err.detail(), "request failed");
                }
                AppError::Edge(err) => error!(error = %err, "edge resolution failed"),
                AppError::Internal(detail) => error!(detail = %detail, "request failed"),
                _ => {}
            }
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurteyt_core::StorageError;

    fn status_and_detail(err: AppError) -> (StatusCode, String) {
        err.status_and_detail()
    }

    #[test]
    fn not_found_is_404() {
        let (status, detail) =
            status_and_detail(ShortUrlError::NotFound("abc12345".to_string()).into());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(detail, "Record not found");
    }

    #[test]
    fn validation_is_client_error_with_detail() {
        let (status, detail) =
            status_and_detail(ShortUrlError::InvalidUrl("URL cannot be empty".to_string()).into());
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(detail.contains("URL cannot be empty"));

        let (status, _) =
            status_and_detail(ShortUrlError::InvalidCursor("bad".to_string()).into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_hide_inner_text() {
        for (err, message) in [
            (
                ShortUrlError::CreateFailed("duplicate entry in kurteyt.short_urls".to_string()),
                "Failed to create record",
            ),
            (
                ShortUrlError::DeleteFailed("lock wait timeout".to_string()),
                "Failed to delete record",
            ),
            (
                ShortUrlError::DatabaseConnectionError("connection refused".to_string()),
                "Failed to connect to database record",
            ),
        ] {
            let (status, detail) = status_and_detail(err.into());
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(detail, message);
        }

        let (status, detail) = status_and_detail(
            ResolverError::Storage(StorageError::Unavailable("host down".to_string())).into(),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail, "Internal Server Error");
    }
}
