//! HTTP error taxonomy and response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending request field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Request failure surfaced as an HTTP status plus JSON body.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    /// Malformed or missing input fields; never fatal.
    #[display("Validation failed")]
    Validation(#[error(ignore)] Vec<FieldError>),
    /// Missing, invalid, or expired credential.
    #[display("{_0}")]
    Auth(#[error(ignore)] String),
    /// Well-formed request that breaks a precondition.
    #[display("{_0}")]
    BadRequest(#[error(ignore)] String),
    /// Duplicate account.
    #[display("{_0}")]
    Conflict(#[error(ignore)] String),
    /// Unknown identity.
    #[display("{_0}")]
    NotFound(#[error(ignore)] String),
    /// Storage or other backend failure.
    #[display("{_0}")]
    Internal(#[error(ignore)] String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "errors": errors }),
            ),
            ApiError::Auth(message) => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": message }),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message }),
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                json!({ "success": false, "message": message }),
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": message }),
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "message": message }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
