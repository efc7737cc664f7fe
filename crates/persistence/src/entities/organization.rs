//! Organization entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the organizations table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationEntity {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub employee_count: Option<i32>,
    pub compliance_targets: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrganizationEntity> for domain::models::Organization {
    fn from(entity: OrganizationEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            industry: entity.industry,
            employee_count: entity.employee_count,
            compliance_targets: entity.compliance_targets,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Aggregate counts behind the organization dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationStatsEntity {
    pub total_controls: i64,
    pub total_policies: i64,
    pub approved_policies: i64,
    pub total_evidence: i64,
    pub accepted_evidence: i64,
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub completed_tasks: i64,
}

impl From<OrganizationStatsEntity> for domain::models::OrganizationStats {
    fn from(entity: OrganizationStatsEntity) -> Self {
        Self {
            completion_percentage: domain::models::organization::completion_percentage(
                entity.completed_tasks,
                entity.total_tasks,
            ),
            total_controls: entity.total_controls,
            total_policies: entity.total_policies,
            approved_policies: entity.approved_policies,
            total_evidence: entity.total_evidence,
            accepted_evidence: entity.accepted_evidence,
            total_tasks: entity.total_tasks,
            pending_tasks: entity.pending_tasks,
            completed_tasks: entity.completed_tasks,
        }
    }
}
