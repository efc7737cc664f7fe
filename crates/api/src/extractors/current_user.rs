//! Authenticated user extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::{User, UserRole};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::rbac::require_role;

/// The user resolved by `require_user_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }

    /// Organization the caller acts for.
    pub fn organization_id(&self) -> Result<Uuid, ApiError> {
        self.0
            .organization_id
            .ok_or_else(|| ApiError::NotFound("No organization found".into()))
    }

    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), ApiError> {
        require_role(self.0.role, allowed)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))
    }
}
