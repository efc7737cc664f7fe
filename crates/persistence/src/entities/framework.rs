//! Framework and control entities (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for control_severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "control_severity", rename_all = "lowercase")]
pub enum ControlSeverityDb {
    Low,
    Medium,
    High,
    Critical,
}

impl From<ControlSeverityDb> for domain::models::ControlSeverity {
    fn from(db: ControlSeverityDb) -> Self {
        match db {
            ControlSeverityDb::Low => Self::Low,
            ControlSeverityDb::Medium => Self::Medium,
            ControlSeverityDb::High => Self::High,
            ControlSeverityDb::Critical => Self::Critical,
        }
    }
}

impl From<domain::models::ControlSeverity> for ControlSeverityDb {
    fn from(domain: domain::models::ControlSeverity) -> Self {
        match domain {
            domain::models::ControlSeverity::Low => Self::Low,
            domain::models::ControlSeverity::Medium => Self::Medium,
            domain::models::ControlSeverity::High => Self::High,
            domain::models::ControlSeverity::Critical => Self::Critical,
        }
    }
}

/// Database row mapping for the frameworks table.
#[derive(Debug, Clone, FromRow)]
pub struct FrameworkEntity {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FrameworkEntity> for domain::models::Framework {
    fn from(entity: FrameworkEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            version: entity.version,
            description: entity.description,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the controls table.
#[derive(Debug, Clone, FromRow)]
pub struct ControlEntity {
    pub id: Uuid,
    pub framework_id: Uuid,
    pub control_code: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub severity: ControlSeverityDb,
    pub guidance_text: Option<String>,
    pub evidence_guidance: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ControlEntity> for domain::models::Control {
    fn from(entity: ControlEntity) -> Self {
        Self {
            id: entity.id,
            framework_id: entity.framework_id,
            control_code: entity.control_code,
            title: entity.title,
            description: entity.description,
            category: entity.category,
            severity: entity.severity.into(),
            guidance_text: entity.guidance_text,
            evidence_guidance: entity.evidence_guidance,
            created_at: entity.created_at,
        }
    }
}

/// Control row joined with the organization's evidence and task counts.
#[derive(Debug, Clone, FromRow)]
pub struct ControlWithCountsEntity {
    #[sqlx(flatten)]
    pub control: ControlEntity,
    pub evidence_count: i64,
    pub task_count: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
}

impl From<ControlWithCountsEntity> for domain::models::ControlWithStatus {
    fn from(entity: ControlWithCountsEntity) -> Self {
        let completion_status = domain::models::CompletionStatus::derive(
            entity.evidence_count,
            entity.task_count,
            entity.completed_tasks,
            entity.in_progress_tasks,
        );
        Self {
            control: entity.control.into(),
            evidence_count: entity.evidence_count,
            task_count: entity.task_count,
            completion_status,
        }
    }
}
