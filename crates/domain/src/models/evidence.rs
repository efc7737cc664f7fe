//! Evidence domain models.
//!
//! Evidence rows are immutable versions: uploading a file with a name that
//! already exists for the same organization and control creates a new row
//! with the next version number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Review state of an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvidenceStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl FromStr for EvidenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EvidenceStatus::Pending),
            "accepted" => Ok(EvidenceStatus::Accepted),
            "rejected" => Ok(EvidenceStatus::Rejected),
            _ => Err(format!("Unknown evidence status: {}", s)),
        }
    }
}

impl std::fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceStatus::Pending => write!(f, "Pending"),
            EvidenceStatus::Accepted => write!(f, "Accepted"),
            EvidenceStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A stored evidence file version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub control_id: Uuid,
    pub file_name: String,
    pub storage_location: String,
    /// Lowercase hex SHA-256 of the stored bytes.
    pub file_hash: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub version: i32,
    pub status: EvidenceStatus,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert an evidence row once the bytes are stored.
/// The version is assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub organization_id: Uuid,
    pub control_id: Uuid,
    pub file_name: String,
    pub storage_location: String,
    pub file_hash: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub uploaded_by: Option<Uuid>,
}

/// Metadata update. Content is never replaced in place; a new upload creates a new version.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEvidenceRequest {
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Review decision. The status is kept as text so an unknown value is a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEvidenceStatusRequest {
    pub status: String,
}

impl UpdateEvidenceStatusRequest {
    pub fn parsed_status(&self) -> Result<EvidenceStatus, String> {
        EvidenceStatus::from_str(self.status.trim())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEvidenceQuery {
    pub control_id: Option<Uuid>,
}
