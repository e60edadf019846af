// Authentication and authorization error types

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::ApiError;

/// Authentication and authorization error types
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    /// Token belongs to a different organization than the requested path
    #[error("Access to this organization is not allowed")]
    OrganizationMismatch,

    /// Role is not allowed to perform mutations
    #[error("Insufficient permissions: ADMIN or MANAGER role required")]
    InsufficientPermissions,
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken => {
                ApiError::Unauthorized(error.to_string())
            }
            AuthError::OrganizationMismatch | AuthError::InsufficientPermissions => {
                ApiError::Forbidden(error.to_string())
            }
            AuthError::TokenGenerationError(message) => ApiError::InternalError(message),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
