//! Control domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Impact rating of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for ControlSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(ControlSeverity::Low),
            "medium" => Ok(ControlSeverity::Medium),
            "high" => Ok(ControlSeverity::High),
            "critical" => Ok(ControlSeverity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for ControlSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlSeverity::Low => write!(f, "Low"),
            ControlSeverity::Medium => write!(f, "Medium"),
            ControlSeverity::High => write!(f, "High"),
            ControlSeverity::Critical => write!(f, "Critical"),
        }
    }
}

/// Progress of an organization on a single control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl CompletionStatus {
    /// Derives the status from the organization's evidence and task counts on a control.
    ///
    /// Completed needs evidence and every task completed; any evidence or an
    /// in-progress task counts as started.
    pub fn derive(
        evidence_count: i64,
        task_count: i64,
        completed_tasks: i64,
        in_progress_tasks: i64,
    ) -> Self {
        if evidence_count > 0 && completed_tasks == task_count {
            CompletionStatus::Completed
        } else if evidence_count > 0 || in_progress_tasks > 0 {
            CompletionStatus::InProgress
        } else {
            CompletionStatus::NotStarted
        }
    }
}

/// A compliance requirement belonging to a framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: Uuid,
    pub framework_id: Uuid,
    pub control_code: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub severity: ControlSeverity,
    pub guidance_text: Option<String>,
    pub evidence_guidance: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Control plus the caller's progress on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlWithStatus {
    #[serde(flatten)]
    pub control: Control,
    pub evidence_count: i64,
    pub task_count: i64,
    pub completion_status: CompletionStatus,
}

/// Query filters for listing controls. Both match case-insensitive substrings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListControlsQuery {
    pub framework: Option<String>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_str_and_display() {
        assert_eq!(ControlSeverity::from_str("high").unwrap(), ControlSeverity::High);
        assert_eq!(ControlSeverity::Critical.to_string(), "Critical");
        assert!(ControlSeverity::from_str("severe").is_err());
    }

    #[test]
    fn test_completion_not_started() {
        assert_eq!(CompletionStatus::derive(0, 0, 0, 0), CompletionStatus::NotStarted);
        assert_eq!(CompletionStatus::derive(0, 2, 0, 0), CompletionStatus::NotStarted);
    }

    #[test]
    fn test_completion_in_progress() {
        assert_eq!(CompletionStatus::derive(0, 2, 0, 1), CompletionStatus::InProgress);
        assert_eq!(CompletionStatus::derive(1, 2, 1, 0), CompletionStatus::InProgress);
    }

    #[test]
    fn test_completion_completed() {
        assert_eq!(CompletionStatus::derive(1, 0, 0, 0), CompletionStatus::Completed);
        assert_eq!(CompletionStatus::derive(3, 2, 2, 0), CompletionStatus::Completed);
    }

    #[test]
    fn test_completion_status_serialization() {
        assert_eq!(
            serde_json::to_string(&CompletionStatus::NotStarted).unwrap(),
            "\"Not Started\""
        );
        assert_eq!(
            serde_json::to_string(&CompletionStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
    }

    #[test]
    fn test_control_with_status_flattens() {
        let control = Control {
            id: Uuid::new_v4(),
            framework_id: Uuid::new_v4(),
            control_code: "CC6.1".into(),
            title: "Logical Access Security".into(),
            description: "Restrict logical access.".into(),
            category: Some("Logical and Physical Access".into()),
            severity: ControlSeverity::Critical,
            guidance_text: None,
            evidence_guidance: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(ControlWithStatus {
            control,
            evidence_count: 2,
            task_count: 1,
            completion_status: CompletionStatus::InProgress,
        })
        .unwrap();

        assert_eq!(json["control_code"], "CC6.1");
        assert_eq!(json["evidence_count"], 2);
        assert_eq!(json["completion_status"], "In Progress");
    }
}
