//! Evidence repository for database operations.
//!
//! Version assignment happens inside the insert transaction while holding a
//! transaction-scoped advisory lock for the (organization, control, file name)
//! triple. The unique index on those columns plus `version` rejects anything
//! that slips past the lock.

use domain::models::{Evidence, EvidenceStatus, NewEvidence};
use domain::services::{next_version, version_lock_key};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{EvidenceEntity, EvidenceStatusDb};
use crate::metrics::QueryTimer;

const EVIDENCE_COLUMNS: &str = "id, organization_id, control_id, uploaded_by, file_name, \
     storage_location, file_hash, file_size, mime_type, description, version, status, \
     created_at, updated_at";

/// Repository for evidence database operations.
#[derive(Clone)]
pub struct EvidenceRepository {
    pool: PgPool,
}

impl EvidenceRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Versions already stored for a triple, ascending.
    pub async fn get_existing_versions(
        &self,
        organization_id: Uuid,
        control_id: Uuid,
        file_name: &str,
    ) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT version FROM evidence
            WHERE organization_id = $1 AND control_id = $2 AND file_name = $3
            ORDER BY version
            "#,
        )
        .bind(organization_id)
        .bind(control_id)
        .bind(file_name)
        .fetch_all(&self.pool)
        .await
    }

    /// Insert a new evidence row with the next version for its triple.
    pub async fn create_versioned(&self, new: &NewEvidence) -> Result<Evidence, sqlx::Error> {
        let timer = QueryTimer::new("create_versioned_evidence");
        let result = self.create_versioned_inner(new).await;
        timer.record();
        result
    }

    async fn create_versioned_inner(&self, new: &NewEvidence) -> Result<Evidence, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        lock_triple(&mut tx, new).await?;

        let existing = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT version FROM evidence
            WHERE organization_id = $1 AND control_id = $2 AND file_name = $3
            "#,
        )
        .bind(new.organization_id)
        .bind(new.control_id)
        .bind(&new.file_name)
        .fetch_all(&mut *tx)
        .await?;
        let version = next_version(&existing);

        let entity = sqlx::query_as::<_, EvidenceEntity>(&format!(
            r#"
            INSERT INTO evidence (organization_id, control_id, uploaded_by, file_name,
                                  storage_location, file_hash, file_size, mime_type,
                                  description, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            EVIDENCE_COLUMNS
        ))
        .bind(new.organization_id)
        .bind(new.control_id)
        .bind(new.uploaded_by)
        .bind(&new.file_name)
        .bind(&new.storage_location)
        .bind(&new.file_hash)
        .bind(new.file_size)
        .bind(new.mime_type.as_deref())
        .bind(new.description.as_deref())
        .bind(version)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(
            organization_id = %new.organization_id,
            control_id = %new.control_id,
            version,
            "Evidence version assigned"
        );
        Ok(entity.into())
    }

    /// Evidence of an organization, newest first, optionally for one control.
    pub async fn list(
        &self,
        organization_id: Uuid,
        control_id: Option<Uuid>,
    ) -> Result<Vec<Evidence>, sqlx::Error> {
        let entities = sqlx::query_as::<_, EvidenceEntity>(&format!(
            r#"
            SELECT {}
            FROM evidence
            WHERE organization_id = $1 AND ($2::UUID IS NULL OR control_id = $2)
            ORDER BY created_at DESC, version DESC
            "#,
            EVIDENCE_COLUMNS
        ))
        .bind(organization_id)
        .bind(control_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// All evidence of an organization in upload order.
    pub async fn list_for_export(&self, organization_id: Uuid) -> Result<Vec<Evidence>, sqlx::Error> {
        let timer = QueryTimer::new("export_evidence_for_organization");
        let result = sqlx::query_as::<_, EvidenceEntity>(&format!(
            r#"
            SELECT {}
            FROM evidence
            WHERE organization_id = $1
            ORDER BY created_at, version
            "#,
            EVIDENCE_COLUMNS
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Evidence>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EvidenceEntity>(&format!(
            "SELECT {} FROM evidence WHERE id = $1 AND organization_id = $2",
            EVIDENCE_COLUMNS
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    pub async fn update_description(
        &self,
        organization_id: Uuid,
        id: Uuid,
        description: Option<&str>,
    ) -> Result<Option<Evidence>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EvidenceEntity>(&format!(
            r#"
            UPDATE evidence
            SET description = COALESCE($3, description), updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {}
            "#,
            EVIDENCE_COLUMNS
        ))
        .bind(id)
        .bind(organization_id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    pub async fn update_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        status: EvidenceStatus,
    ) -> Result<Option<Evidence>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EvidenceEntity>(&format!(
            r#"
            UPDATE evidence
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {}
            "#,
            EVIDENCE_COLUMNS
        ))
        .bind(id)
        .bind(organization_id)
        .bind(EvidenceStatusDb::from(status))
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Delete a row, returning it so the caller can remove the stored bytes.
    pub async fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Evidence>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EvidenceEntity>(&format!(
            "DELETE FROM evidence WHERE id = $1 AND organization_id = $2 RETURNING {}",
            EVIDENCE_COLUMNS
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }
}

async fn lock_triple(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewEvidence,
) -> Result<(), sqlx::Error> {
    let key = version_lock_key(&new.organization_id, &new.control_id, &new.file_name);
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
