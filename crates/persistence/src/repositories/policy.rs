//! Policy repository for database operations.

use domain::models::{Policy, PolicyStatus, UpdatePolicyRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PolicyEntity, PolicyStatusDb};
use crate::metrics::QueryTimer;

/// Repository for policy database operations.
#[derive(Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        framework_id: Option<Uuid>,
        title: &str,
        content: &str,
        status: PolicyStatus,
    ) -> Result<Policy, sqlx::Error> {
        let entity = sqlx::query_as::<_, PolicyEntity>(
            r#"
            INSERT INTO policies (organization_id, framework_id, title, content, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, organization_id, framework_id, title, content, status, version,
                      created_at, updated_at
            "#,
        )
        .bind(organization_id)
        .bind(framework_id)
        .bind(title)
        .bind(content)
        .bind(PolicyStatusDb::from(status))
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Policies of an organization, newest first.
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Policy>, sqlx::Error> {
        let entities = sqlx::query_as::<_, PolicyEntity>(
            r#"
            SELECT id, organization_id, framework_id, title, content, status, version,
                   created_at, updated_at
            FROM policies
            WHERE organization_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Policies of an organization for one framework, in creation order.
    pub async fn list_for_framework(
        &self,
        organization_id: Uuid,
        framework_id: Uuid,
    ) -> Result<Vec<Policy>, sqlx::Error> {
        let timer = QueryTimer::new("export_policies_for_framework");
        let result = sqlx::query_as::<_, PolicyEntity>(
            r#"
            SELECT id, organization_id, framework_id, title, content, status, version,
                   created_at, updated_at
            FROM policies
            WHERE organization_id = $1 AND framework_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(organization_id)
        .bind(framework_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Policy>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PolicyEntity>(
            r#"
            SELECT id, organization_id, framework_id, title, content, status, version,
                   created_at, updated_at
            FROM policies
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Apply a partial update. The version is bumped when the content differs.
    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        request: &UpdatePolicyRequest,
    ) -> Result<Option<Policy>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PolicyEntity>(
            r#"
            UPDATE policies
            SET
                title = COALESCE($3, title),
                version = CASE
                    WHEN $4::TEXT IS NOT NULL AND $4 IS DISTINCT FROM content THEN version + 1
                    ELSE version
                END,
                content = COALESCE($4, content),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING id, organization_id, framework_id, title, content, status, version,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .bind(request.title.as_deref())
        .bind(request.content.as_deref())
        .bind(request.status.map(PolicyStatusDb::from))
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM policies WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
