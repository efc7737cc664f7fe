//! Evidence entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for evidence_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "evidence_status", rename_all = "lowercase")]
pub enum EvidenceStatusDb {
    Pending,
    Accepted,
    Rejected,
}

impl From<EvidenceStatusDb> for domain::models::EvidenceStatus {
    fn from(db: EvidenceStatusDb) -> Self {
        match db {
            EvidenceStatusDb::Pending => Self::Pending,
            EvidenceStatusDb::Accepted => Self::Accepted,
            EvidenceStatusDb::Rejected => Self::Rejected,
        }
    }
}

impl From<domain::models::EvidenceStatus> for EvidenceStatusDb {
    fn from(domain: domain::models::EvidenceStatus) -> Self {
        match domain {
            domain::models::EvidenceStatus::Pending => Self::Pending,
            domain::models::EvidenceStatus::Accepted => Self::Accepted,
            domain::models::EvidenceStatus::Rejected => Self::Rejected,
        }
    }
}

/// Database row mapping for the evidence table.
#[derive(Debug, Clone, FromRow)]
pub struct EvidenceEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub control_id: Uuid,
    pub uploaded_by: Option<Uuid>,
    pub file_name: String,
    pub storage_location: String,
    pub file_hash: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub version: i32,
    pub status: EvidenceStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EvidenceEntity> for domain::models::Evidence {
    fn from(entity: EvidenceEntity) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            control_id: entity.control_id,
            file_name: entity.file_name,
            storage_location: entity.storage_location,
            file_hash: entity.file_hash,
            file_size: entity.file_size,
            mime_type: entity.mime_type,
            description: entity.description,
            version: entity.version,
            status: entity.status.into(),
            uploaded_by: entity.uploaded_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
