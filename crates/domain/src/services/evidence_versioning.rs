//! Version assignment for evidence files.
//!
//! Versions are keyed by (organization, control, file name). The caller is
//! responsible for serializing concurrent assignments for the same key; this
//! module only computes the number.

use uuid::Uuid;

/// First version assigned to a file name that has never been uploaded.
pub const INITIAL_VERSION: i32 = 1;

/// Returns the version to assign given the versions already stored: one
/// above the current maximum.
pub fn next_version(existing: &[i32]) -> i32 {
    existing
        .iter()
        .copied()
        .max()
        .map(|max| max.max(0) + 1)
        .unwrap_or(INITIAL_VERSION)
}

/// Key used to serialize version assignment for one evidence triple.
pub fn version_lock_key(organization_id: &Uuid, control_id: &Uuid, file_name: &str) -> String {
    format!("evidence:{}:{}:{}", organization_id, control_id, file_name)
}
