//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::{HistogramError, TimeIndexError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Document found but of the wrong shape
    Unprocessable { message: String, location: String },
    /// No usable time index
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Unprocessable { message, location } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("FORMAT_ERROR", message).with_details(location),
            ),
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("NO_DATA", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<TimeIndexError> for AppError {
    fn from(err: TimeIndexError) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

impl From<HistogramError> for AppError {
    fn from(err: HistogramError) -> Self {
        match err {
            HistogramError::NotFound { .. } => AppError::NotFound(err.to_string()),
            HistogramError::Format { ref location, .. } => AppError::Unprocessable {
                location: location.clone(),
                message: err.to_string(),
            },
        }
    }
}
