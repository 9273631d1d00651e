//! Custom error types for the API service

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not the owner of the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload exceeds the configured limit
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Ingestion pipeline failure
    #[error("Media error: {0}")]
    Media(#[from] media::MediaError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Media(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(format!("Unable to parse multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_message, detail) = match &self {
            ApiError::BadRequest(msg) => ("Bad request".to_string(), Some(msg.clone())),
            ApiError::Unauthorized(msg) => ("Unauthorized".to_string(), Some(msg.clone())),
            ApiError::Forbidden(msg) => ("Forbidden".to_string(), Some(msg.clone())),
            ApiError::NotFound(msg) => ("Not found".to_string(), Some(msg.clone())),
            ApiError::PayloadTooLarge => ("Payload too large".to_string(), None),
            ApiError::Media(e) => {
                error!(error = %e, "Upload processing failed");
                ("Upload processing failed".to_string(), None)
            }
            ApiError::Database(e) => {
                error!(error = %e, "Database operation failed");
                ("Database error".to_string(), None)
            }
        };

        let body = match detail {
            Some(detail) => json!({ "error": error_message, "detail": detail }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
