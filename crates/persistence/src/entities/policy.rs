//! Policy entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for policy_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "policy_status", rename_all = "snake_case")]
pub enum PolicyStatusDb {
    Draft,
    UnderReview,
    Approved,
}

impl From<PolicyStatusDb> for domain::models::PolicyStatus {
    fn from(db: PolicyStatusDb) -> Self {
        match db {
            PolicyStatusDb::Draft => Self::Draft,
            PolicyStatusDb::UnderReview => Self::UnderReview,
            PolicyStatusDb::Approved => Self::Approved,
        }
    }
}

impl From<domain::models::PolicyStatus> for PolicyStatusDb {
    fn from(domain: domain::models::PolicyStatus) -> Self {
        match domain {
            domain::models::PolicyStatus::Draft => Self::Draft,
            domain::models::PolicyStatus::UnderReview => Self::UnderReview,
            domain::models::PolicyStatus::Approved => Self::Approved,
        }
    }
}

/// Database row mapping for the policies table.
#[derive(Debug, Clone, FromRow)]
pub struct PolicyEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub framework_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub status: PolicyStatusDb,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PolicyEntity> for domain::models::Policy {
    fn from(entity: PolicyEntity) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            framework_id: entity.framework_id,
            title: entity.title,
            content: entity.content,
            status: entity.status.into(),
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
