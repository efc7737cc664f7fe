//! Organization repository for database operations.

use domain::models::{Organization, OrganizationStats, UpdateOrganizationRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{OrganizationEntity, OrganizationStatsEntity};
use crate::metrics::QueryTimer;

/// Repository for organization database operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new organization.
    pub async fn create(
        &self,
        name: &str,
        industry: Option<&str>,
    ) -> Result<Organization, sqlx::Error> {
        let entity = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            INSERT INTO organizations (name, industry)
            VALUES ($1, $2)
            RETURNING id, name, industry, employee_count, compliance_targets, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(industry)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find organization by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, sqlx::Error> {
        let entity = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            SELECT id, name, industry, employee_count, compliance_targets, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Apply a partial update. Absent fields keep their value.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateOrganizationRequest,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let entity = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            UPDATE organizations
            SET
                name = COALESCE($2, name),
                industry = COALESCE($3, industry),
                employee_count = COALESCE($4, employee_count),
                compliance_targets = COALESCE($5, compliance_targets),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, industry, employee_count, compliance_targets, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref())
        .bind(request.industry.as_deref())
        .bind(request.employee_count)
        .bind(request.compliance_targets.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Dashboard statistics for an organization.
    pub async fn stats(&self, id: Uuid) -> Result<OrganizationStats, sqlx::Error> {
        let timer = QueryTimer::new("organization_stats");
        let result = sqlx::query_as::<_, OrganizationStatsEntity>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM controls) AS total_controls,
                (SELECT COUNT(*) FROM policies WHERE organization_id = $1) AS total_policies,
                (SELECT COUNT(*) FROM policies WHERE organization_id = $1 AND status = 'approved') AS approved_policies,
                (SELECT COUNT(*) FROM evidence WHERE organization_id = $1) AS total_evidence,
                (SELECT COUNT(*) FROM evidence WHERE organization_id = $1 AND status = 'accepted') AS accepted_evidence,
                (SELECT COUNT(*) FROM tasks WHERE organization_id = $1) AS total_tasks,
                (SELECT COUNT(*) FROM tasks WHERE organization_id = $1 AND status = 'pending') AS pending_tasks,
                (SELECT COUNT(*) FROM tasks WHERE organization_id = $1 AND status = 'completed') AS completed_tasks
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?.into())
    }
}
