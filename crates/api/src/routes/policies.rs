//! Policy documents.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{
    CreatePolicyRequest, GeneratePolicyRequest, Policy, PolicyStatus, UpdatePolicyRequest,
    UserRole,
};
use domain::services::generate_policy;
use persistence::repositories::{OrganizationRepository, PolicyRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

fn not_found() -> ApiError {
    ApiError::NotFound("Policy not found".into())
}

/// GET /api/v1/policies
pub async fn list_policies(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Policy>>, ApiError> {
    let organization_id = user.organization_id()?;
    let policies = PolicyRepository::new(state.pool.clone())
        .list(organization_id)
        .await?;
    Ok(Json(policies))
}

/// POST /api/v1/policies
pub async fn create_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    request.validate()?;
    let organization_id = user.organization_id()?;

    let policy = PolicyRepository::new(state.pool.clone())
        .create(
            organization_id,
            request.framework_id,
            request.title.trim(),
            &request.content,
            request.status,
        )
        .await?;

    tracing::info!(policy_id = %policy.id, organization_id = %organization_id, "Policy created");
    Ok((StatusCode::CREATED, Json(policy)))
}

/// POST /api/v1/policies/generate
///
/// Renders a built-in template and stores it as a draft.
pub async fn generate(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<GeneratePolicyRequest>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    request.validate()?;
    let organization_id = user.organization_id()?;

    let company_name = match request
        .company_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        Some(name) => name.to_string(),
        None => OrganizationRepository::new(state.pool.clone())
            .find_by_id(organization_id)
            .await?
            .map(|org| org.name)
            .ok_or_else(|| ApiError::NotFound("Organization not found".into()))?,
    };

    let generated = generate_policy(&request.policy_type, &company_name, Utc::now().date_naive());
    let policy = PolicyRepository::new(state.pool.clone())
        .create(
            organization_id,
            request.framework_id,
            &generated.title,
            &generated.content,
            PolicyStatus::Draft,
        )
        .await?;

    tracing::info!(
        policy_id = %policy.id,
        policy_type = %request.policy_type,
        "Policy generated from template"
    );
    Ok((StatusCode::CREATED, Json(policy)))
}

/// GET /api/v1/policies/:policy_id
pub async fn get_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(policy_id): Path<Uuid>,
) -> Result<Json<Policy>, ApiError> {
    let organization_id = user.organization_id()?;
    PolicyRepository::new(state.pool.clone())
        .find_by_id(organization_id, policy_id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PUT /api/v1/policies/:policy_id
pub async fn update_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(policy_id): Path<Uuid>,
    Json(request): Json<UpdatePolicyRequest>,
) -> Result<Json<Policy>, ApiError> {
    request.validate()?;
    let organization_id = user.organization_id()?;

    PolicyRepository::new(state.pool.clone())
        .update(organization_id, policy_id, &request)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/v1/policies/:policy_id
pub async fn delete_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(policy_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.require_role(UserRole::MANAGERS)?;
    let organization_id = user.organization_id()?;

    if !PolicyRepository::new(state.pool.clone())
        .delete(organization_id, policy_id)
        .await?
    {
        return Err(not_found());
    }

    tracing::info!(policy_id = %policy_id, "Policy deleted");
    Ok(StatusCode::NO_CONTENT)
}
