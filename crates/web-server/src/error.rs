use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Upload storage error: {0}")]
    Upload(#[from] std::io::Error),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(err.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Upload(io_err) => {
                tracing::error!(error = ?io_err, "Upload storage error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store the uploaded file".to_string(),
                )
            }
            AppError::Validation(message) => {
                tracing::debug!(%message, "Rejected request.");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

/// A store fault on a lookup endpoint.
///
/// Lookups keep their success-shaped body on failure: list endpoints answer
/// `[]` and the details endpoint answers `null`, both with a 500 status.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup listing failed: {0}")]
    List(database::DbError),
    #[error("Details lookup failed: {0}")]
    Details(database::DbError),
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let body = match &self {
            LookupError::List(err) => {
                tracing::error!(error = ?err, "Lookup listing failed.");
                json!([])
            }
            LookupError::Details(err) => {
                tracing::error!(error = ?err, "Details lookup failed.");
                serde_json::Value::Null
            }
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
