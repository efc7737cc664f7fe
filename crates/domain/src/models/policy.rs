//! Policy domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Review state of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolicyStatus {
    #[default]
    Draft,
    #[serde(rename = "Under Review")]
    UnderReview,
    Approved,
}

impl FromStr for PolicyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PolicyStatus::Draft),
            "under review" | "under_review" => Ok(PolicyStatus::UnderReview),
            "approved" => Ok(PolicyStatus::Approved),
            _ => Err(format!("Unknown policy status: {}", s)),
        }
    }
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyStatus::Draft => write!(f, "Draft"),
            PolicyStatus::UnderReview => write!(f, "Under Review"),
            PolicyStatus::Approved => write!(f, "Approved"),
        }
    }
}

/// An organization's written policy, stored as Markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub framework_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub status: PolicyStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePolicyRequest {
    pub framework_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    pub status: PolicyStatus,
}

/// Partial update. A content change bumps the policy version.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePolicyRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub content: Option<String>,

    pub status: Option<PolicyStatus>,
}

impl UpdatePolicyRequest {
    /// Whether applying this update to `current` changes its content.
    pub fn changes_content(&self, current: &Policy) -> bool {
        self.content
            .as_deref()
            .map(|c| c != current.content)
            .unwrap_or(false)
    }
}

/// Request to generate a policy from a built-in template.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GeneratePolicyRequest {
    #[validate(length(min = 1, max = 64, message = "Policy type must be 1-64 characters"))]
    pub policy_type: String,

    pub framework_id: Option<Uuid>,

    #[validate(length(max = 255, message = "Company name must be at most 255 characters"))]
    pub company_name: Option<String>,
}
