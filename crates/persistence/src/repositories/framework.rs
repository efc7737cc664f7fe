//! Framework and control repository for database operations.

use domain::models::{Control, ControlWithStatus, Framework, ListControlsQuery};
use domain::services::ControlLibrary;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ControlEntity, ControlSeverityDb, ControlWithCountsEntity, FrameworkEntity};
use crate::metrics::QueryTimer;

/// Outcome of seeding the built-in control library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub frameworks_created: u64,
    pub controls_created: u64,
}

/// Repository for frameworks and their controls.
#[derive(Clone)]
pub struct FrameworkRepository {
    pool: PgPool,
}

impl FrameworkRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Framework>, sqlx::Error> {
        let entities = sqlx::query_as::<_, FrameworkEntity>(
            r#"
            SELECT id, name, version, description, created_at
            FROM frameworks
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Framework>, sqlx::Error> {
        let entity = sqlx::query_as::<_, FrameworkEntity>(
            r#"
            SELECT id, name, version, description, created_at
            FROM frameworks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    pub async fn find_control(&self, id: Uuid) -> Result<Option<Control>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ControlEntity>(
            r#"
            SELECT id, framework_id, control_code, title, description, category, severity,
                   guidance_text, evidence_guidance, created_at
            FROM controls
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Controls of one framework ordered by control code.
    pub async fn controls_for_framework(
        &self,
        framework_id: Uuid,
    ) -> Result<Vec<Control>, sqlx::Error> {
        let timer = QueryTimer::new("export_controls_for_framework");
        let result = sqlx::query_as::<_, ControlEntity>(
            r#"
            SELECT id, framework_id, control_code, title, description, category, severity,
                   guidance_text, evidence_guidance, created_at
            FROM controls
            WHERE framework_id = $1
            ORDER BY control_code
            "#,
        )
        .bind(framework_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Controls with the organization's evidence and task counts.
    ///
    /// `framework` and `category` are case-insensitive substring filters.
    pub async fn list_controls_with_status(
        &self,
        organization_id: Uuid,
        query: &ListControlsQuery,
    ) -> Result<Vec<ControlWithStatus>, sqlx::Error> {
        let timer = QueryTimer::new("list_controls_with_status");
        let result = self
            .controls_with_status(
                organization_id,
                query.framework.as_deref(),
                query.category.as_deref(),
                None,
            )
            .await;
        timer.record();
        result
    }

    /// One control with the organization's evidence and task counts.
    pub async fn find_control_with_status(
        &self,
        organization_id: Uuid,
        control_id: Uuid,
    ) -> Result<Option<ControlWithStatus>, sqlx::Error> {
        let mut controls = self
            .controls_with_status(organization_id, None, None, Some(control_id))
            .await?;
        Ok(controls.pop())
    }

    async fn controls_with_status(
        &self,
        organization_id: Uuid,
        framework: Option<&str>,
        category: Option<&str>,
        control_id: Option<Uuid>,
    ) -> Result<Vec<ControlWithStatus>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ControlWithCountsEntity>(
            r#"
            SELECT c.id, c.framework_id, c.control_code, c.title, c.description, c.category,
                   c.severity, c.guidance_text, c.evidence_guidance, c.created_at,
                   COALESCE(e.evidence_count, 0) AS evidence_count,
                   COALESCE(t.task_count, 0) AS task_count,
                   COALESCE(t.completed_tasks, 0) AS completed_tasks,
                   COALESCE(t.in_progress_tasks, 0) AS in_progress_tasks
            FROM controls c
            JOIN frameworks f ON f.id = c.framework_id
            LEFT JOIN (
                SELECT control_id, COUNT(*) AS evidence_count
                FROM evidence
                WHERE organization_id = $1
                GROUP BY control_id
            ) e ON e.control_id = c.id
            LEFT JOIN (
                SELECT control_id,
                       COUNT(*) AS task_count,
                       COUNT(*) FILTER (WHERE status = 'completed') AS completed_tasks,
                       COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress_tasks
                FROM tasks
                WHERE organization_id = $1
                GROUP BY control_id
            ) t ON t.control_id = c.id
            WHERE ($2::TEXT IS NULL OR f.name ILIKE '%' || $2 || '%')
              AND ($3::TEXT IS NULL OR c.category ILIKE '%' || $3 || '%')
              AND ($4::UUID IS NULL OR c.id = $4)
            ORDER BY c.control_code
            "#,
        )
        .bind(organization_id)
        .bind(framework)
        .bind(category)
        .bind(control_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Inserts the built-in frameworks and controls. Existing rows are left untouched,
    /// so seeding twice is a no-op.
    pub async fn seed_library(&self, library: &ControlLibrary) -> Result<SeedResult, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut result = SeedResult {
            frameworks_created: 0,
            controls_created: 0,
        };

        for framework in &library.frameworks {
            let inserted = sqlx::query(
                r#"
                INSERT INTO frameworks (name, version, description)
                VALUES ($1, $2, $3)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(&framework.name)
            .bind(&framework.version)
            .bind(&framework.description)
            .execute(&mut *tx)
            .await?;
            result.frameworks_created += inserted.rows_affected();

            let framework_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                SELECT id FROM frameworks WHERE name = $1
                "#,
            )
            .bind(&framework.name)
            .fetch_one(&mut *tx)
            .await?;

            for control in &framework.controls {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO controls (framework_id, control_code, title, description, category,
                                          severity, guidance_text, evidence_guidance)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ON CONFLICT (framework_id, control_code) DO NOTHING
                    "#,
                )
                .bind(framework_id)
                .bind(&control.control_code)
                .bind(&control.title)
                .bind(&control.description)
                .bind(&control.category)
                .bind(ControlSeverityDb::from(control.severity))
                .bind(&control.guidance_text)
                .bind(&control.evidence_guidance)
                .execute(&mut *tx)
                .await?;
                result.controls_created += inserted.rows_affected();
            }
        }

        tx.commit().await?;
        tracing::info!(
            frameworks_created = result.frameworks_created,
            controls_created = result.controls_created,
            "Control library seeded"
        );
        Ok(result)
    }
}
