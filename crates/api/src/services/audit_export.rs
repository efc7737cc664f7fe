//! Audit export lifecycle: `processing -> ready | failed`.
//!
//! An export runs to completion inside the request. Failures are recorded on
//! the row and surfaced to the caller; there is no retry.

use domain::models::{AuditExport, ExportStatus, ExportType};
use persistence::repositories::{AuditExportRepository, FrameworkRepository};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::record_audit_export;
use crate::services::aggregator::{AggregateError, Aggregator};
use crate::services::artifact::{self, ArtifactError};
use crate::storage::{BlobReader, BlobStore, StorageError};

#[derive(Debug, Error)]
enum GenerateError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Failed to store artifact: {0}")]
    Store(#[from] StorageError),
}

/// An open artifact ready to stream.
pub struct ExportDownload {
    pub file_name: String,
    pub size: u64,
    pub reader: BlobReader,
}

#[derive(Clone)]
pub struct AuditExportService {
    exports: AuditExportRepository,
    frameworks: FrameworkRepository,
    aggregator: Aggregator,
    evidence_store: Arc<dyn BlobStore>,
    export_store: Arc<dyn BlobStore>,
}

impl AuditExportService {
    pub fn new(
        pool: PgPool,
        evidence_store: Arc<dyn BlobStore>,
        export_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            exports: AuditExportRepository::new(pool.clone()),
            frameworks: FrameworkRepository::new(pool.clone()),
            aggregator: Aggregator::new(pool),
            evidence_store,
            export_store,
        }
    }

    /// Creates the record, builds and stores the artifact, and returns the
    /// record in its terminal state. An unknown framework fails before any
    /// record is created.
    pub async fn request_export(
        &self,
        organization_id: Uuid,
        framework_id: Uuid,
        export_type: ExportType,
    ) -> Result<AuditExport, ApiError> {
        if self.frameworks.find_by_id(framework_id).await?.is_none() {
            return Err(ApiError::NotFound("Framework not found".into()));
        }

        let record = self
            .exports
            .create(organization_id, framework_id, export_type)
            .await?;
        let start = Instant::now();

        let outcome = match self
            .generate(organization_id, record.id, framework_id, export_type)
            .await
        {
            Ok(location) => self.complete(record.id, location).await,
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(location) => {
                record_audit_export(export_type.as_str(), ExportStatus::Ready.as_str());
                tracing::info!(
                    export_id = %record.id,
                    organization_id = %organization_id,
                    export_type = export_type.as_str(),
                    location = %location,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Audit export ready"
                );
            }
            Err(message) => {
                tracing::error!(
                    export_id = %record.id,
                    organization_id = %organization_id,
                    error = %message,
                    "Audit export failed"
                );
                self.fail(record.id, &message).await;
                record_audit_export(export_type.as_str(), ExportStatus::Failed.as_str());
                return Err(ApiError::ExportFailed(message));
            }
        }

        self.exports
            .find_by_id(organization_id, record.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Export not found".into()))
    }

    /// Marks the record ready. If that cannot be recorded the stored
    /// artifact is removed and the export is treated as failed.
    async fn complete(&self, export_id: Uuid, location: String) -> Result<String, String> {
        match self.exports.mark_ready(export_id, &location).await {
            Ok(true) => Ok(location),
            Ok(false) => {
                tracing::warn!(export_id = %export_id, "Export left processing before completion");
                Ok(location)
            }
            Err(e) => {
                if let Err(delete_err) = self.export_store.delete(&location).await {
                    tracing::warn!(
                        export_id = %export_id,
                        location = %location,
                        error = %delete_err,
                        "Failed to remove orphaned export artifact"
                    );
                }
                Err(format!("Failed to record export completion: {}", e))
            }
        }
    }

    /// Best-effort `processing -> failed`. The caller reports the original
    /// error whatever happens here.
    async fn fail(&self, export_id: Uuid, message: &str) {
        match self.exports.mark_failed(export_id, message).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(export_id = %export_id, "Export already terminal; failure not recorded")
            }
            Err(e) => tracing::error!(
                export_id = %export_id,
                error = %e,
                "Failed to record export failure"
            ),
        }
    }

    async fn generate(
        &self,
        organization_id: Uuid,
        export_id: Uuid,
        framework_id: Uuid,
        export_type: ExportType,
    ) -> Result<String, GenerateError> {
        let snapshot = self.aggregator.snapshot(organization_id, framework_id).await?;
        let artifact =
            artifact::build(&snapshot, export_type, self.evidence_store.as_ref()).await?;

        let key = artifact_key(organization_id, export_id, &artifact.file_name);
        Ok(self.export_store.put(&key, &artifact.bytes).await?)
    }

    pub async fn get(&self, organization_id: Uuid, export_id: Uuid) -> Result<AuditExport, ApiError> {
        self.exports
            .find_by_id(organization_id, export_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Export not found".into()))
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<AuditExport>, ApiError> {
        Ok(self.exports.list(organization_id).await?)
    }

    /// Opens the artifact of a ready export.
    pub async fn fetch_artifact(
        &self,
        organization_id: Uuid,
        export_id: Uuid,
    ) -> Result<ExportDownload, ApiError> {
        let export = self.get(organization_id, export_id).await?;

        let location = match export.download_location.clone() {
            Some(location) if export.is_downloadable() => location,
            _ => {
                return Err(ApiError::InvalidState(
                    "Export not ready for download".into(),
                ))
            }
        };

        let (reader, size) = self.export_store.open(&location).await.map_err(|e| match e {
            StorageError::NotFound(_) => ApiError::NotFound("Export file not found".into()),
            other => other.into(),
        })?;

        Ok(ExportDownload {
            file_name: download_name(&location),
            size,
            reader,
        })
    }
}

/// `{organization_id}/{export_id}/{file name}`. The file name only has
/// one-second resolution, so the export id keeps artifacts apart.
fn artifact_key(organization_id: Uuid, export_id: Uuid, file_name: &str) -> String {
    format!("{}/{}/{}", organization_id, export_id, file_name)
}

/// File name offered to the client: the last path segment of the location.
fn download_name(location: &str) -> String {
    Path::new(location)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(location)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_name() {
        let org = Uuid::new_v4();
        assert_eq!(
            download_name(&format!(
                "{}/{}/audit_export_x_SOC_2_20260101_000000.zip",
                org,
                Uuid::new_v4()
            )),
            "audit_export_x_SOC_2_20260101_000000.zip"
        );
        assert_eq!(download_name("plain.html"), "plain.html");
    }

    #[test]
    fn test_artifact_keys_differ_per_export() {
        let org = Uuid::new_v4();
        let name = format!("audit_export_{}_SOC_2_20260101_000000.html", org);

        let first = artifact_key(org, Uuid::new_v4(), &name);
        let second = artifact_key(org, Uuid::new_v4(), &name);

        assert_ne!(first, second);
        assert_eq!(download_name(&first), name);
        assert_eq!(download_name(&second), name);
    }

    #[test]
    fn test_generate_error_messages_pass_through() {
        let err: GenerateError = StorageError::UploadFailed("disk full".into()).into();
        assert_eq!(err.to_string(), "Failed to store artifact: Upload failed: disk full");

        let err: GenerateError = AggregateError::FrameworkNotFound(Uuid::nil()).into();
        assert!(err.to_string().contains("not found"));
    }
}
