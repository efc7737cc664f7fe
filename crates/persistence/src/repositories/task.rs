//! Task repository for database operations.

use domain::models::{CreateTaskRequest, ListTasksQuery, Task, UpdateTaskRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{TaskEntity, TaskPriorityDb, TaskStatusDb};
use crate::metrics::QueryTimer;

const TASK_COLUMNS: &str = "id, organization_id, control_id, owner_id, title, description, \
     due_date, status, priority, notes, created_at, updated_at";

/// Repository for task database operations.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        owner_id: Uuid,
        request: &CreateTaskRequest,
    ) -> Result<Task, sqlx::Error> {
        let entity = sqlx::query_as::<_, TaskEntity>(&format!(
            r#"
            INSERT INTO tasks (organization_id, control_id, owner_id, title, description,
                               due_date, priority)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(organization_id)
        .bind(request.control_id)
        .bind(request.owner_id.unwrap_or(owner_id))
        .bind(&request.title)
        .bind(request.description.as_deref())
        .bind(request.due_date)
        .bind(TaskPriorityDb::from(request.priority))
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Tasks of an organization: due date ascending with undated last, then newest first.
    pub async fn list(
        &self,
        organization_id: Uuid,
        query: &ListTasksQuery,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let entities = sqlx::query_as::<_, TaskEntity>(&format!(
            r#"
            SELECT {}
            FROM tasks
            WHERE organization_id = $1
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::UUID IS NULL OR control_id = $3)
              AND ($4::UUID IS NULL OR owner_id = $4)
            ORDER BY due_date ASC NULLS LAST, created_at DESC
            "#,
            TASK_COLUMNS
        ))
        .bind(organization_id)
        .bind(query.status.map(TaskStatusDb::from))
        .bind(query.control_id)
        .bind(query.owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// All tasks of an organization for export aggregation.
    pub async fn list_for_export(&self, organization_id: Uuid) -> Result<Vec<Task>, sqlx::Error> {
        let timer = QueryTimer::new("export_tasks_for_organization");
        let result = sqlx::query_as::<_, TaskEntity>(&format!(
            "SELECT {} FROM tasks WHERE organization_id = $1 ORDER BY created_at",
            TASK_COLUMNS
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
    ) -> Result<Option<Task>, sqlx::Error> {
        let entity = sqlx::query_as::<_, TaskEntity>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND organization_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        request: &UpdateTaskRequest,
    ) -> Result<Option<Task>, sqlx::Error> {
        let entity = sqlx::query_as::<_, TaskEntity>(&format!(
            r#"
            UPDATE tasks
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                due_date = COALESCE($5, due_date),
                status = COALESCE($6, status),
                priority = COALESCE($7, priority),
                notes = COALESCE($8, notes),
                owner_id = COALESCE($9, owner_id),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(organization_id)
        .bind(request.title.as_deref())
        .bind(request.description.as_deref())
        .bind(request.due_date)
        .bind(request.status.map(TaskStatusDb::from))
        .bind(request.priority.map(TaskPriorityDb::from))
        .bind(request.notes.as_deref())
        .bind(request.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
