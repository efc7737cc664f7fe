//! Task entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for task_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatusDb {
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl From<TaskStatusDb> for domain::models::TaskStatus {
    fn from(db: TaskStatusDb) -> Self {
        match db {
            TaskStatusDb::Pending => Self::Pending,
            TaskStatusDb::InProgress => Self::InProgress,
            TaskStatusDb::Completed => Self::Completed,
            TaskStatusDb::Blocked => Self::Blocked,
        }
    }
}

impl From<domain::models::TaskStatus> for TaskStatusDb {
    fn from(domain: domain::models::TaskStatus) -> Self {
        match domain {
            domain::models::TaskStatus::Pending => Self::Pending,
            domain::models::TaskStatus::InProgress => Self::InProgress,
            domain::models::TaskStatus::Completed => Self::Completed,
            domain::models::TaskStatus::Blocked => Self::Blocked,
        }
    }
}

/// Database enum for task_priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriorityDb {
    Low,
    Medium,
    High,
}

impl From<TaskPriorityDb> for domain::models::TaskPriority {
    fn from(db: TaskPriorityDb) -> Self {
        match db {
            TaskPriorityDb::Low => Self::Low,
            TaskPriorityDb::Medium => Self::Medium,
            TaskPriorityDb::High => Self::High,
        }
    }
}

impl From<domain::models::TaskPriority> for TaskPriorityDb {
    fn from(domain: domain::models::TaskPriority) -> Self {
        match domain {
            domain::models::TaskPriority::Low => Self::Low,
            domain::models::TaskPriority::Medium => Self::Medium,
            domain::models::TaskPriority::High => Self::High,
        }
    }
}

/// Database row mapping for the tasks table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub control_id: Uuid,
    pub owner_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatusDb,
    pub priority: TaskPriorityDb,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskEntity> for domain::models::Task {
    fn from(entity: TaskEntity) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            control_id: entity.control_id,
            owner_id: entity.owner_id,
            title: entity.title,
            description: entity.description,
            due_date: entity.due_date,
            status: entity.status.into(),
            priority: entity.priority.into(),
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
