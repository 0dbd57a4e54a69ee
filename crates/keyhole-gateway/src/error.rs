use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keyhole_core::StorageError;
use keyhole_shortener::ShortenerError;
use tracing::error;

use crate::model::MessageResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The create request had no usable `url` field.
    MissingUrl,
    /// A redirect lookup missed.
    ShortUrlNotFound,
    /// A delete removed nothing.
    UrlNotFound,
    Shortener(ShortenerError),
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        AppError::Shortener(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingUrl => (
                StatusCode::BAD_REQUEST,
                "Missing 'url' in request body".to_string(),
            ),
            AppError::ShortUrlNotFound => {
                (StatusCode::NOT_FOUND, "Short URL not found".to_string())
            }
            AppError::UrlNotFound | AppError::Shortener(ShortenerError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "URL not found".to_string())
            }
            AppError::Shortener(
                err @ ShortenerError::Storage(
                    StorageError::Unavailable(_) | StorageError::Timeout(_),
                ),
            ) => {
                error!(error = %err, "storage backend is not reachable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("An error occurred: {err}"),
                )
            }
            AppError::Shortener(err) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred: {err}"),
                )
            }
        };

        (status, Json(MessageResponse::new(message))).into_response()
    }
}
