//! Repository implementations for database operations.

pub mod audit_export;
pub mod evidence;
pub mod framework;
pub mod organization;
pub mod policy;
pub mod task;
pub mod user;

pub use audit_export::AuditExportRepository;
pub use evidence::EvidenceRepository;
pub use framework::{FrameworkRepository, SeedResult};
pub use organization::OrganizationRepository;
pub use policy::PolicyRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
