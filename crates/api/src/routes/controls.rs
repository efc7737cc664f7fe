//! Controls with the caller's progress, and library seeding.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{ControlWithStatus, ListControlsQuery, UserRole};
use domain::services::ControlLibrary;
use persistence::repositories::{FrameworkRepository, SeedResult};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub frameworks_created: u64,
    pub controls_created: u64,
}

impl From<SeedResult> for SeedResponse {
    fn from(result: SeedResult) -> Self {
        Self {
            message: format!(
                "Seeded {} frameworks and {} controls",
                result.frameworks_created, result.controls_created
            ),
            frameworks_created: result.frameworks_created,
            controls_created: result.controls_created,
        }
    }
}

/// GET /api/v1/controls?framework=&category=
pub async fn list_controls(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListControlsQuery>,
) -> Result<Json<Vec<ControlWithStatus>>, ApiError> {
    let organization_id = user.organization_id()?;
    let controls = FrameworkRepository::new(state.pool.clone())
        .list_controls_with_status(organization_id, &query)
        .await?;

    Ok(Json(controls))
}

/// GET /api/v1/controls/:control_id
pub async fn get_control(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(control_id): Path<Uuid>,
) -> Result<Json<ControlWithStatus>, ApiError> {
    let organization_id = user.organization_id()?;
    FrameworkRepository::new(state.pool.clone())
        .find_control_with_status(organization_id, control_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Control not found".into()))
}

/// POST /api/v1/controls/seed
///
/// Idempotent: existing frameworks and controls are left untouched.
pub async fn seed_controls(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<SeedResponse>, ApiError> {
    user.require_role(UserRole::MANAGERS)?;

    let library = ControlLibrary::builtin()
        .map_err(|e| ApiError::Internal(format!("Control library is invalid: {}", e)))?;
    let result = FrameworkRepository::new(state.pool.clone())
        .seed_library(&library)
        .await?;

    Ok(Json(result.into()))
}
