//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod audit_export;
pub mod evidence;
pub mod framework;
pub mod organization;
pub mod policy;
pub mod task;
pub mod user;

pub use audit_export::{AuditExportEntity, ExportStatusDb, ExportTypeDb};
pub use evidence::{EvidenceEntity, EvidenceStatusDb};
pub use framework::{ControlEntity, ControlSeverityDb, ControlWithCountsEntity, FrameworkEntity};
pub use organization::{OrganizationEntity, OrganizationStatsEntity};
pub use policy::{PolicyEntity, PolicyStatusDb};
pub use task::{TaskEntity, TaskPriorityDb, TaskStatusDb};
pub use user::{UserEntity, UserRoleDb};
