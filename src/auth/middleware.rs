// Authentication extractor for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Authenticated staff member extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Reject access to another organization's resources
    pub fn require_organization(&self, organization_id: Uuid) -> Result<(), AuthError> {
        if self.organization_id != organization_id {
            warn!(
                "Organization mismatch: user_id={}, token_org={}, path_org={}",
                self.user_id, self.organization_id, organization_id
            );
            return Err(AuthError::OrganizationMismatch);
        }
        Ok(())
    }

    /// Only ADMIN and MANAGER may mutate pricing and inventory state
    pub fn require_manager(&self) -> Result<(), AuthError> {
        if !self.role.can_manage() {
            warn!(
                "Authorization failed: user_id={}, role={}",
                self.user_id, self.role
            );
            return Err(AuthError::InsufficientPermissions);
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        // Verify Bearer token format
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let token_service = TokenService::from_ref(state);
        let claims = token_service.validate_access_token(token)?;

        debug!(
            "Authenticated user_id={}, org={}, role={}",
            claims.sub, claims.organization_id, claims.role
        );

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            organization_id: claims.organization_id,
            role: claims.role,
        })
    }
}
