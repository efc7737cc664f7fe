//! Audit export lifecycle.

use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use domain::models::{AuditExport, CreateAuditExportRequest, UserRole};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::routes::attachment;
use crate::services::AuditExportService;

fn export_service(state: &AppState) -> AuditExportService {
    AuditExportService::new(
        state.pool.clone(),
        state.evidence_store.clone(),
        state.export_store.clone(),
    )
}

/// GET /api/v1/audits
pub async fn list_exports(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<AuditExport>>, ApiError> {
    let organization_id = user.organization_id()?;
    Ok(Json(export_service(&state).list(organization_id).await?))
}

/// POST /api/v1/audits/export
///
/// Builds the artifact inline and answers once the export is `Ready`.
pub async fn create_export(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateAuditExportRequest>,
) -> Result<(StatusCode, Json<AuditExport>), ApiError> {
    user.require_role(UserRole::MANAGERS)?;
    let export_type = request
        .parsed_export_type()
        .map_err(ApiError::Validation)?;
    let organization_id = user.organization_id()?;

    let export = export_service(&state)
        .request_export(organization_id, request.framework_id, export_type)
        .await?;

    Ok((StatusCode::CREATED, Json(export)))
}

/// GET /api/v1/audits/:export_id
pub async fn get_export(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(export_id): Path<Uuid>,
) -> Result<Json<AuditExport>, ApiError> {
    let organization_id = user.organization_id()?;
    Ok(Json(export_service(&state).get(organization_id, export_id).await?))
}

/// GET /api/v1/audits/:export_id/download
pub async fn download_export(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(export_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let organization_id = user.organization_id()?;
    let download = export_service(&state)
        .fetch_artifact(organization_id, export_id)
        .await?;

    attachment(
        &download.file_name,
        "application/octet-stream",
        download.size,
        Body::from_stream(ReaderStream::new(download.reader)),
    )
}
