//! Evidence upload and lifecycle.
//!
//! Bytes are hashed and stored first; the row is inserted afterwards with a
//! version assigned by the repository. If the insert fails the stored bytes
//! are removed again.

use domain::models::{Evidence, EvidenceStatus, NewEvidence};
use persistence::repositories::{EvidenceRepository, FrameworkRepository};
use shared::crypto::sha256_bytes_hex;
use shared::validation::{sanitize_file_name, validate_file_name};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::record_evidence_upload;
use crate::storage::{BlobReader, BlobStore, StorageError};

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    pub control_id: Uuid,
    pub file_name: String,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct EvidenceDownload {
    pub evidence: Evidence,
    pub size: u64,
    pub reader: BlobReader,
}

#[derive(Clone)]
pub struct EvidenceService {
    evidence: EvidenceRepository,
    frameworks: FrameworkRepository,
    store: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
}

impl EvidenceService {
    pub fn new(pool: PgPool, store: Arc<dyn BlobStore>, max_upload_bytes: usize) -> Self {
        Self {
            evidence: EvidenceRepository::new(pool.clone()),
            frameworks: FrameworkRepository::new(pool),
            store,
            max_upload_bytes,
        }
    }

    /// Stores a new version of `upload.file_name` for the control.
    pub async fn upload(
        &self,
        organization_id: Uuid,
        uploaded_by: Uuid,
        upload: EvidenceUpload,
    ) -> Result<Evidence, ApiError> {
        let start = Instant::now();

        validate_file_name(&upload.file_name).map_err(|e| {
            ApiError::Validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid file name".into()),
            )
        })?;
        check_size(upload.bytes.len(), self.max_upload_bytes)?;

        if self.frameworks.find_control(upload.control_id).await?.is_none() {
            return Err(ApiError::NotFound("Control not found".into()));
        }

        let file_hash = sha256_bytes_hex(&upload.bytes);
        let mime_type = upload
            .content_type
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| {
                mime_guess::from_path(&upload.file_name)
                    .first_raw()
                    .map(str::to_string)
            });

        let key = storage_key(organization_id, &upload.file_name);
        let storage_location = self.store.put(&key, &upload.bytes).await?;

        let new = NewEvidence {
            organization_id,
            control_id: upload.control_id,
            file_name: upload.file_name,
            storage_location: storage_location.clone(),
            file_hash,
            file_size: upload.bytes.len() as i64,
            mime_type,
            description: upload.description.filter(|d| !d.trim().is_empty()),
            uploaded_by: Some(uploaded_by),
        };

        let evidence = match self.evidence.create_versioned(&new).await {
            Ok(evidence) => evidence,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&storage_location).await {
                    tracing::warn!(
                        location = %storage_location,
                        error = %cleanup,
                        "Failed to remove orphaned evidence bytes"
                    );
                }
                return Err(version_conflict_or(e));
            }
        };

        record_evidence_upload(upload.bytes.len());
        tracing::info!(
            evidence_id = %evidence.id,
            organization_id = %organization_id,
            control_id = %evidence.control_id,
            version = evidence.version,
            size_bytes = evidence.file_size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Evidence uploaded"
        );

        Ok(evidence)
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        control_id: Option<Uuid>,
    ) -> Result<Vec<Evidence>, ApiError> {
        Ok(self.evidence.list(organization_id, control_id).await?)
    }

    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<Evidence, ApiError> {
        self.evidence
            .find_by_id(organization_id, id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn download(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<EvidenceDownload, ApiError> {
        let evidence = self.get(organization_id, id).await?;
        let (reader, size) = self
            .store
            .open(&evidence.storage_location)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => ApiError::NotFound("Evidence file not found".into()),
                other => other.into(),
            })?;

        Ok(EvidenceDownload {
            evidence,
            size,
            reader,
        })
    }

    pub async fn update_description(
        &self,
        organization_id: Uuid,
        id: Uuid,
        description: Option<&str>,
    ) -> Result<Evidence, ApiError> {
        self.evidence
            .update_description(organization_id, id, description)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn update_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        status: EvidenceStatus,
    ) -> Result<Evidence, ApiError> {
        let evidence = self
            .evidence
            .update_status(organization_id, id, status)
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(evidence_id = %id, status = %status, "Evidence reviewed");
        Ok(evidence)
    }

    /// Removes the row and then its bytes.
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let evidence = self
            .evidence
            .delete(organization_id, id)
            .await?
            .ok_or_else(not_found)?;

        if let Err(e) = self.store.delete(&evidence.storage_location).await {
            tracing::warn!(
                evidence_id = %id,
                location = %evidence.storage_location,
                error = %e,
                "Evidence row deleted but bytes could not be removed"
            );
        }
        Ok(())
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Evidence not found".into())
}

fn check_size(size: usize, max: usize) -> Result<(), ApiError> {
    if size > max {
        return Err(ApiError::Validation(format!(
            "File exceeds the maximum upload size of {} bytes",
            max
        )));
    }
    Ok(())
}

/// `{organization_id}/{random}_{sanitized name}`; the random part keeps
/// versions of one file name apart.
fn storage_key(organization_id: Uuid, file_name: &str) -> String {
    format!(
        "{}/{}_{}",
        organization_id,
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

fn version_conflict_or(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            ApiError::Conflict("A concurrent upload claimed this version; retry the upload".into())
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_layout() {
        let org = Uuid::new_v4();
        let key = storage_key(org, "../Q3 report.pdf");
        let (prefix, rest) = key.split_once('/').unwrap();

        assert_eq!(prefix, org.to_string());
        assert!(!rest.contains('/'));
        assert!(rest.ends_with("_Q3_report.pdf"));
        assert_ne!(storage_key(org, "a.pdf"), storage_key(org, "a.pdf"));
    }

    #[test]
    fn test_size_limit() {
        assert!(check_size(10, 10).is_ok());
        assert!(matches!(check_size(11, 10), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_identical_bytes_hash_identically() {
        let a = sha256_bytes_hex(b"same content");
        let b = sha256_bytes_hex(b"same content");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sha256_bytes_hex(b"other content"));
    }
}
