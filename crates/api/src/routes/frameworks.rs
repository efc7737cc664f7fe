//! Compliance framework catalog.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::Framework;
use persistence::repositories::FrameworkRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// GET /api/v1/frameworks
pub async fn list_frameworks(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Framework>>, ApiError> {
    let frameworks = FrameworkRepository::new(state.pool.clone()).list().await?;
    Ok(Json(frameworks))
}

/// GET /api/v1/frameworks/:framework_id
pub async fn get_framework(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(framework_id): Path<Uuid>,
) -> Result<Json<Framework>, ApiError> {
    FrameworkRepository::new(state.pool.clone())
        .find_by_id(framework_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Framework not found".into()))
}
