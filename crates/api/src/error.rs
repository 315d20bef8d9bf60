use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use romen_core::error::CoreError;
use romen_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for catalog
/// errors, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce the `{"status": "error", "message": ...}` JSON shape the
/// front end expects.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `romen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A library catalog error from `romen_db`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Device(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Integrity(msg) => {
                    tracing::error!(error = %msg, "Integrity error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                    )
                }
                CoreError::Io(err) => {
                    tracing::error!(error = %err, "I/O error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Catalog errors ---
            AppError::Store(StoreError::NoRoot) => (
                StatusCode::BAD_REQUEST,
                "No storage device selected.".to_string(),
            ),
            AppError::Store(err) => {
                tracing::error!(error = %err, "Catalog error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "status": "error",
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
