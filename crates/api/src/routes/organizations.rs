//! The caller's organization.

use axum::{extract::State, Json};
use domain::models::{Organization, OrganizationStats, UpdateOrganizationRequest, UserRole};
use persistence::repositories::OrganizationRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// GET /api/v1/organizations/me
pub async fn get_my_organization(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Organization>, ApiError> {
    let organization_id = user.organization_id()?;
    let organization = OrganizationRepository::new(state.pool.clone())
        .find_by_id(organization_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization not found".into()))?;

    Ok(Json(organization))
}

/// PUT /api/v1/organizations/me
pub async fn update_my_organization(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, ApiError> {
    user.require_role(UserRole::MANAGERS)?;
    request.validate()?;
    let organization_id = user.organization_id()?;

    let organization = OrganizationRepository::new(state.pool.clone())
        .update(organization_id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization not found".into()))?;

    tracing::info!(organization_id = %organization_id, "Organization updated");
    Ok(Json(organization))
}

/// GET /api/v1/organizations/me/stats
pub async fn get_my_organization_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<OrganizationStats>, ApiError> {
    let organization_id = user.organization_id()?;
    let stats = OrganizationRepository::new(state.pool.clone())
        .stats(organization_id)
        .await?;

    Ok(Json(stats))
}
