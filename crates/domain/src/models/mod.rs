//! Domain models for Compliance Checkpoint.

pub mod audit_export;
pub mod control;
pub mod evidence;
pub mod framework;
pub mod organization;
pub mod policy;
pub mod task;
pub mod user;

pub use audit_export::{
    artifact_file_name, AuditExport, CreateAuditExportRequest, ExportStatus, ExportType,
};
pub use control::{CompletionStatus, Control, ControlSeverity, ControlWithStatus, ListControlsQuery};
pub use evidence::{
    Evidence, EvidenceStatus, ListEvidenceQuery, NewEvidence, UpdateEvidenceRequest,
    UpdateEvidenceStatusRequest,
};
pub use framework::Framework;
pub use organization::{Organization, OrganizationStats, UpdateOrganizationRequest};
pub use policy::{
    CreatePolicyRequest, GeneratePolicyRequest, Policy, PolicyStatus, UpdatePolicyRequest,
};
pub use task::{CreateTaskRequest, ListTasksQuery, Task, TaskPriority, TaskStatus, UpdateTaskRequest};
pub use user::{User, UserRole};
