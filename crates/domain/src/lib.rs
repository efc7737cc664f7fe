//! Domain layer for the Compliance Checkpoint backend.
//!
//! This crate contains:
//! - Domain models (Organization, Control, Policy, Evidence, Task, AuditExport)
//! - Business logic for evidence versioning and export snapshots
//! - The built-in control library and policy templates

pub mod models;
pub mod services;
