//! Audit export domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Artifact format of an export.
///
/// The `PDF` wire value produces a print-ready HTML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportType {
    #[serde(rename = "ZIP")]
    Zip,
    #[serde(rename = "PDF", alias = "HTML")]
    Html,
}

impl ExportType {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportType::Zip => "zip",
            ExportType::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportType::Zip => "application/zip",
            ExportType::Html => "text/html; charset=utf-8",
        }
    }

    /// Label used in metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportType::Zip => "zip",
            ExportType::Html => "html",
        }
    }
}

impl FromStr for ExportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zip" => Ok(ExportType::Zip),
            "pdf" | "html" => Ok(ExportType::Html),
            _ => Err(format!("Unsupported export type: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportType::Zip => write!(f, "ZIP"),
            ExportType::Html => write!(f, "PDF"),
        }
    }
}

/// Lifecycle state of an export record.
///
/// `Pending` is never persisted; records are created directly in `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportStatus {
    Pending,
    Processing,
    Ready,
    Failed,
}

impl ExportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Pending => "pending",
            ExportStatus::Processing => "processing",
            ExportStatus::Ready => "ready",
            ExportStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::Pending => write!(f, "Pending"),
            ExportStatus::Processing => write!(f, "Processing"),
            ExportStatus::Ready => write!(f, "Ready"),
            ExportStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// A request to export one framework for one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub framework_id: Uuid,
    pub export_type: ExportType,
    pub status: ExportStatus,
    /// Set exactly when `status` is `Ready`.
    pub download_location: Option<String>,
    /// Set only when `status` is `Failed`.
    pub error_message: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuditExport {
    pub fn is_downloadable(&self) -> bool {
        self.status == ExportStatus::Ready && self.download_location.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuditExportRequest {
    pub framework_id: Uuid,

    #[serde(default = "default_export_type")]
    #[validate(length(min = 1, max = 20, message = "Export type is required"))]
    pub export_type: String,
}

impl CreateAuditExportRequest {
    pub fn parsed_export_type(&self) -> Result<ExportType, String> {
        ExportType::from_str(self.export_type.trim())
    }
}

fn default_export_type() -> String {
    "PDF".to_string()
}

/// File name of an export artifact:
/// `audit_export_{org}_{framework}_{%Y%m%d_%H%M%S}.{ext}` with spaces in the
/// framework name replaced by underscores.
pub fn artifact_file_name(
    organization_id: Uuid,
    framework_name: &str,
    at: DateTime<Utc>,
    export_type: ExportType,
) -> String {
    format!(
        "audit_export_{}_{}_{}.{}",
        organization_id,
        framework_name.replace(' ', "_"),
        at.format("%Y%m%d_%H%M%S"),
        export_type.extension()
    )
}
