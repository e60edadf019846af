// Error handling module for the hotel rates API
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Main error type for the API
/// All handlers, services and repositories return Result<T, ApiError>
///
/// Restriction violations during rate calculation are not errors; only
/// structural problems (missing entities, cross-organization access,
/// malformed requests) and storage failures are represented here.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    #[error("Request validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Malformed or semantically invalid request
    /// Maps to HTTP 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    /// Resource absent or soft-deleted
    /// Maps to HTTP 404 Not Found
    #[error("{resource} with id {id} not found")]
    NotFound { resource: String, id: String },

    /// Duplicate resource or conflicting state
    /// Maps to HTTP 409 Conflict
    #[error("{message}")]
    Conflict { message: String },

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    #[error("{0}")]
    Unauthorized(String),

    /// Cross-organization access or insufficient role
    /// Maps to HTTP 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    /// Database operation errors
    /// Maps to HTTP 500, details are never sent to clients
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500, details are never sent to clients
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Shorthand result type used across the crate
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code sent to clients
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert ApiError to an ErrorResponse, logging at a level that matches
    /// the severity: error! for 500s, warn! for conflicts and access denials,
    /// debug! for expected client mistakes.
    fn to_error_response(&self) -> ErrorResponse {
        let (message, details) = match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                (
                    "Request validation failed".to_string(),
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                )
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                (message.clone(), None)
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (self.to_string(), None)
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                (message.clone(), None)
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                (message.clone(), None)
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (message.clone(), None)
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                ("A database error occurred".to_string(), None)
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ("An internal server error occurred".to_string(), None)
            }
        };

        ErrorResponse {
            success: false,
            error_code: self.error_code().to_string(),
            message,
            details,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Consistent error response structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always false, mirrors the success envelope
    pub success: bool,

    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Field-level validation errors, omitted when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.to_error_response())).into_response()
    }
}
