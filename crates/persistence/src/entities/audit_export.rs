//! Audit export entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for export_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "export_type", rename_all = "lowercase")]
pub enum ExportTypeDb {
    Zip,
    Html,
}

impl From<ExportTypeDb> for domain::models::ExportType {
    fn from(db: ExportTypeDb) -> Self {
        match db {
            ExportTypeDb::Zip => Self::Zip,
            ExportTypeDb::Html => Self::Html,
        }
    }
}

impl From<domain::models::ExportType> for ExportTypeDb {
    fn from(domain: domain::models::ExportType) -> Self {
        match domain {
            domain::models::ExportType::Zip => Self::Zip,
            domain::models::ExportType::Html => Self::Html,
        }
    }
}

/// Database enum for export_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "export_status", rename_all = "lowercase")]
pub enum ExportStatusDb {
    Pending,
    Processing,
    Ready,
    Failed,
}

impl From<ExportStatusDb> for domain::models::ExportStatus {
    fn from(db: ExportStatusDb) -> Self {
        match db {
            ExportStatusDb::Pending => Self::Pending,
            ExportStatusDb::Processing => Self::Processing,
            ExportStatusDb::Ready => Self::Ready,
            ExportStatusDb::Failed => Self::Failed,
        }
    }
}

/// Database row mapping for the audit_exports table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditExportEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub framework_id: Uuid,
    pub export_type: ExportTypeDb,
    pub status: ExportStatusDb,
    pub download_location: Option<String>,
    pub error_message: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditExportEntity> for domain::models::AuditExport {
    fn from(entity: AuditExportEntity) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            framework_id: entity.framework_id,
            export_type: entity.export_type.into(),
            status: entity.status.into(),
            download_location: entity.download_location,
            error_message: entity.error_message,
            generated_at: entity.generated_at,
            created_at: entity.created_at,
        }
    }
}
