//! Role checks for organization-scoped handlers.

use domain::models::UserRole;

use crate::error::ApiError;

/// Fails with `Forbidden` unless `role` is one of `allowed`.
pub fn require_role(role: UserRole, allowed: &[UserRole]) -> Result<(), ApiError> {
    if role.is_one_of(allowed) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("Role {} not authorized", role)))
    }
}
