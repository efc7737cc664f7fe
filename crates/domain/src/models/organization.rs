//! Organization domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A tenant. Every control-facing record is scoped by organization id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub employee_count: Option<i32>,
    pub compliance_targets: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of the caller's organization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "Industry must be at most 100 characters"))]
    pub industry: Option<String>,

    #[validate(range(min = 1, max = 1_000_000, message = "Employee count must be positive"))]
    pub employee_count: Option<i32>,

    #[validate(length(max = 10, message = "At most 10 compliance targets"))]
    pub compliance_targets: Option<Vec<String>>,
}

/// Readiness figures for the organization dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationStats {
    pub total_controls: i64,
    pub total_policies: i64,
    pub approved_policies: i64,
    pub total_evidence: i64,
    pub accepted_evidence: i64,
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub completed_tasks: i64,
    pub completion_percentage: f64,
}

/// Percentage of completed tasks, rounded to one decimal. Zero when there are no tasks.
pub fn completion_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = completed as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}
