//! Domain services for Compliance Checkpoint.
//!
//! Services contain business logic that operates on domain models.

pub mod control_library;
pub mod evidence_versioning;
pub mod export_snapshot;
pub mod policy_templates;

pub use control_library::{ControlLibrary, ControlSeed, FrameworkSeed};
pub use evidence_versioning::{next_version, version_lock_key, INITIAL_VERSION};
pub use export_snapshot::{ControlSummary, ExportSnapshot, ExportSummary};
pub use policy_templates::{find_template, generate_policy, GeneratedPolicy, PolicyTemplate};
