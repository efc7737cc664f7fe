//! Remediation tasks attached to controls.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateTaskRequest, ListTasksQuery, Task, UpdateTaskRequest};
use persistence::repositories::{FrameworkRepository, TaskRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

fn not_found() -> ApiError {
    ApiError::NotFound("Task not found".into())
}

/// GET /api/v1/tasks?status=&control_id=&owner_id=
pub async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let organization_id = user.organization_id()?;
    let tasks = TaskRepository::new(state.pool.clone())
        .list(organization_id, &query)
        .await?;
    Ok(Json(tasks))
}

/// GET /api/v1/tasks/my
pub async fn list_my_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    let organization_id = user.organization_id()?;
    let query = ListTasksQuery {
        owner_id: Some(user.id()),
        ..Default::default()
    };
    let tasks = TaskRepository::new(state.pool.clone())
        .list(organization_id, &query)
        .await?;
    Ok(Json(tasks))
}

/// GET /api/v1/tasks/:task_id
pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let organization_id = user.organization_id()?;
    TaskRepository::new(state.pool.clone())
        .find_by_id(organization_id, task_id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    request.validate()?;
    let organization_id = user.organization_id()?;

    if FrameworkRepository::new(state.pool.clone())
        .find_control(request.control_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Control not found".into()));
    }

    let task = TaskRepository::new(state.pool.clone())
        .create(organization_id, user.id(), &request)
        .await?;

    tracing::info!(task_id = %task.id, control_id = %task.control_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/v1/tasks/:task_id
pub async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    request.validate()?;
    let organization_id = user.organization_id()?;

    TaskRepository::new(state.pool.clone())
        .update(organization_id, task_id, &request)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/v1/tasks/:task_id
pub async fn delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let organization_id = user.organization_id()?;

    if !TaskRepository::new(state.pool.clone())
        .delete(organization_id, task_id)
        .await?
    {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
