//! Audit export repository for database operations.
//!
//! Status transitions are conditional updates that only apply to rows still
//! in `processing`; they report whether a row changed.

use domain::models::{AuditExport, ExportType};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AuditExportEntity, ExportTypeDb};

const EXPORT_COLUMNS: &str = "id, organization_id, framework_id, export_type, status, \
     download_location, error_message, generated_at, created_at";

/// Repository for audit export records.
#[derive(Clone)]
pub struct AuditExportRepository {
    pool: PgPool,
}

impl AuditExportRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a record in `processing`.
    pub async fn create(
        &self,
        organization_id: Uuid,
        framework_id: Uuid,
        export_type: ExportType,
    ) -> Result<AuditExport, sqlx::Error> {
        let entity = sqlx::query_as::<_, AuditExportEntity>(&format!(
            r#"
            INSERT INTO audit_exports (organization_id, framework_id, export_type, status)
            VALUES ($1, $2, $3, 'processing')
            RETURNING {}
            "#,
            EXPORT_COLUMNS
        ))
        .bind(organization_id)
        .bind(framework_id)
        .bind(ExportTypeDb::from(export_type))
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AuditExport>, sqlx::Error> {
        let entity = sqlx::query_as::<_, AuditExportEntity>(&format!(
            "SELECT {} FROM audit_exports WHERE id = $1 AND organization_id = $2",
            EXPORT_COLUMNS
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Exports of an organization, newest first.
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<AuditExport>, sqlx::Error> {
        let entities = sqlx::query_as::<_, AuditExportEntity>(&format!(
            r#"
            SELECT {}
            FROM audit_exports
            WHERE organization_id = $1
            ORDER BY created_at DESC
            "#,
            EXPORT_COLUMNS
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// `processing -> ready`, recording where the artifact lives.
    pub async fn mark_ready(&self, id: Uuid, download_location: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE audit_exports
            SET status = 'ready', download_location = $2, generated_at = NOW()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(download_location)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// `processing -> failed`, keeping the error message.
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE audit_exports
            SET status = 'failed', error_message = $2, download_location = NULL
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
