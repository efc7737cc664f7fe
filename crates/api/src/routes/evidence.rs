//! Evidence upload, review and download.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use domain::models::{
    Evidence, ListEvidenceQuery, UpdateEvidenceRequest, UpdateEvidenceStatusRequest, UserRole,
};
use tokio_util::io::ReaderStream;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::routes::attachment;
use crate::services::evidence::{EvidenceService, EvidenceUpload};

fn evidence_service(state: &AppState) -> EvidenceService {
    EvidenceService::new(
        state.pool.clone(),
        state.evidence_store.clone(),
        state.config.storage.max_upload_bytes,
    )
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::Validation("File exceeds the maximum upload size".into())
    } else {
        ApiError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadForm {
    control_id: Option<Uuid>,
    description: Option<String>,
    file: Option<(String, Option<String>, Vec<u8>)>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "control_id" => {
                    let text = field.text().await.map_err(multipart_error)?;
                    let id = Uuid::parse_str(text.trim())
                        .map_err(|_| ApiError::Validation("control_id must be a UUID".into()))?;
                    form.control_id = Some(id);
                }
                "description" => {
                    form.description = Some(field.text().await.map_err(multipart_error)?);
                }
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.file = Some((file_name, content_type, bytes.to_vec()));
                }
                other => {
                    tracing::debug!(field = other, "Ignoring unknown multipart field");
                }
            }
        }

        Ok(form)
    }

    fn into_upload(self) -> Result<EvidenceUpload, ApiError> {
        let control_id = self
            .control_id
            .ok_or_else(|| ApiError::Validation("control_id is required".into()))?;
        let (file_name, content_type, bytes) = self
            .file
            .ok_or_else(|| ApiError::Validation("file is required".into()))?;

        Ok(EvidenceUpload {
            control_id,
            file_name,
            content_type,
            description: self.description,
            bytes,
        })
    }
}

/// GET /api/v1/evidence?control_id=
pub async fn list_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListEvidenceQuery>,
) -> Result<Json<Vec<Evidence>>, ApiError> {
    let organization_id = user.organization_id()?;
    let evidence = evidence_service(&state)
        .list(organization_id, query.control_id)
        .await?;
    Ok(Json(evidence))
}

/// GET /api/v1/evidence/control/:control_id
pub async fn list_control_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(control_id): Path<Uuid>,
) -> Result<Json<Vec<Evidence>>, ApiError> {
    let organization_id = user.organization_id()?;
    let evidence = evidence_service(&state)
        .list(organization_id, Some(control_id))
        .await?;
    Ok(Json(evidence))
}

/// POST /api/v1/evidence/upload
pub async fn upload_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Evidence>), ApiError> {
    let organization_id = user.organization_id()?;
    let upload = UploadForm::read(multipart).await?.into_upload()?;

    let evidence = evidence_service(&state)
        .upload(organization_id, user.id(), upload)
        .await?;

    Ok((StatusCode::CREATED, Json(evidence)))
}

/// GET /api/v1/evidence/:evidence_id
pub async fn get_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(evidence_id): Path<Uuid>,
) -> Result<Json<Evidence>, ApiError> {
    let organization_id = user.organization_id()?;
    let evidence = evidence_service(&state)
        .get(organization_id, evidence_id)
        .await?;
    Ok(Json(evidence))
}

/// GET /api/v1/evidence/:evidence_id/download
pub async fn download_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(evidence_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let organization_id = user.organization_id()?;
    let download = evidence_service(&state)
        .download(organization_id, evidence_id)
        .await?;

    let content_type = download
        .evidence
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    attachment(
        &download.evidence.file_name,
        content_type,
        download.size,
        Body::from_stream(ReaderStream::new(download.reader)),
    )
}

/// PUT /api/v1/evidence/:evidence_id
pub async fn update_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(evidence_id): Path<Uuid>,
    Json(request): Json<UpdateEvidenceRequest>,
) -> Result<Json<Evidence>, ApiError> {
    request.validate()?;
    let organization_id = user.organization_id()?;

    let evidence = evidence_service(&state)
        .update_description(organization_id, evidence_id, request.description.as_deref())
        .await?;
    Ok(Json(evidence))
}

/// PUT /api/v1/evidence/:evidence_id/status
pub async fn update_evidence_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(evidence_id): Path<Uuid>,
    Json(request): Json<UpdateEvidenceStatusRequest>,
) -> Result<Json<Evidence>, ApiError> {
    user.require_role(UserRole::REVIEWERS)?;
    let status = request.parsed_status().map_err(ApiError::Validation)?;
    let organization_id = user.organization_id()?;

    let evidence = evidence_service(&state)
        .update_status(organization_id, evidence_id, status)
        .await?;
    Ok(Json(evidence))
}

/// DELETE /api/v1/evidence/:evidence_id
pub async fn delete_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(evidence_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.require_role(UserRole::MANAGERS)?;
    let organization_id = user.organization_id()?;

    evidence_service(&state)
        .delete(organization_id, evidence_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_form_requires_control_and_file() {
        let form = UploadForm {
            file: Some(("a.pdf".into(), None, b"x".to_vec())),
            ..Default::default()
        };
        assert!(matches!(form.into_upload(), Err(ApiError::Validation(_))));

        let form = UploadForm {
            control_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(matches!(form.into_upload(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_upload_form_into_upload() {
        let control_id = Uuid::new_v4();
        let form = UploadForm {
            control_id: Some(control_id),
            description: Some("Q1 access review".into()),
            file: Some((
                "review.pdf".into(),
                Some("application/pdf".into()),
                b"%PDF".to_vec(),
            )),
        };
        let upload = form.into_upload().unwrap();
        assert_eq!(upload.control_id, control_id);
        assert_eq!(upload.file_name, "review.pdf");
        assert_eq!(upload.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(upload.bytes, b"%PDF");
    }
}
