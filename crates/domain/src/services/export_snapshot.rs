//! Point-in-time view of everything an audit export contains.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Control, Evidence, Framework, Policy, Task};

/// Aggregated state of one organization for one framework.
///
/// Built once per export and never mutated. Per-control counts are grouped
/// by control id at construction.
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    pub organization_id: Uuid,
    pub framework: Framework,
    pub controls: Vec<Control>,
    pub policies: Vec<Policy>,
    pub evidence: Vec<Evidence>,
    pub tasks: Vec<Task>,
    pub taken_at: DateTime<Utc>,
    evidence_counts: HashMap<Uuid, usize>,
    task_counts: HashMap<Uuid, usize>,
}

/// Contents of `summary.json` in ZIP exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub framework: String,
    pub export_date: String,
    pub total_controls: usize,
    pub total_policies: usize,
    pub total_evidence: usize,
    pub controls: Vec<ControlSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub code: String,
    pub title: String,
    pub description: String,
    pub evidence_count: usize,
    pub task_count: usize,
}

impl ExportSnapshot {
    pub fn new(
        organization_id: Uuid,
        framework: Framework,
        controls: Vec<Control>,
        policies: Vec<Policy>,
        evidence: Vec<Evidence>,
        tasks: Vec<Task>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        let mut evidence_counts = HashMap::new();
        for item in &evidence {
            *evidence_counts.entry(item.control_id).or_insert(0) += 1;
        }
        let mut task_counts = HashMap::new();
        for task in &tasks {
            *task_counts.entry(task.control_id).or_insert(0) += 1;
        }

        Self {
            organization_id,
            framework,
            controls,
            policies,
            evidence,
            tasks,
            taken_at,
            evidence_counts,
            task_counts,
        }
    }

    pub fn evidence_count(&self, control_id: Uuid) -> usize {
        self.evidence_counts.get(&control_id).copied().unwrap_or(0)
    }

    pub fn task_count(&self, control_id: Uuid) -> usize {
        self.task_counts.get(&control_id).copied().unwrap_or(0)
    }

    /// Evidence attached to a control, in snapshot order.
    pub fn evidence_for_control(&self, control_id: Uuid) -> impl Iterator<Item = &Evidence> {
        self.evidence
            .iter()
            .filter(move |e| e.control_id == control_id)
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            framework: self.framework.name.clone(),
            export_date: self.taken_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            total_controls: self.controls.len(),
            total_policies: self.policies.len(),
            total_evidence: self.evidence.len(),
            controls: self
                .controls
                .iter()
                .map(|c| ControlSummary {
                    code: c.control_code.clone(),
                    title: c.title.clone(),
                    description: c.description.clone(),
                    evidence_count: self.evidence_count(c.id),
                    task_count: self.task_count(c.id),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::{
        ControlSeverity, EvidenceStatus, PolicyStatus, TaskPriority, TaskStatus,
    };

    pub fn framework(name: &str) -> Framework {
        Framework {
            id: Uuid::new_v4(),
            name: name.into(),
            version: "2017".into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn control(framework_id: Uuid, code: &str) -> Control {
        Control {
            id: Uuid::new_v4(),
            framework_id,
            control_code: code.into(),
            title: format!("{} title", code),
            description: format!("{} description", code),
            category: None,
            severity: ControlSeverity::High,
            guidance_text: None,
            evidence_guidance: None,
            created_at: Utc::now(),
        }
    }

    pub fn evidence(org: Uuid, control_id: Uuid, file_name: &str) -> Evidence {
        Evidence {
            id: Uuid::new_v4(),
            organization_id: org,
            control_id,
            file_name: file_name.into(),
            storage_location: format!("{}/{}", org, file_name),
            file_hash: "0".repeat(64),
            file_size: 0,
            mime_type: None,
            description: None,
            version: 1,
            status: EvidenceStatus::Accepted,
            uploaded_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn task(org: Uuid, control_id: Uuid) -> Task {
        Task {
            id: Uuid::new_v4(),
            organization_id: org,
            control_id,
            owner_id: None,
            title: "Review".into(),
            description: None,
            due_date: None,
            status: TaskStatus::Completed,
            priority: TaskPriority::Medium,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn policy(org: Uuid, framework_id: Uuid, title: &str) -> Policy {
        Policy {
            id: Uuid::new_v4(),
            organization_id: org,
            framework_id: Some(framework_id),
            title: title.into(),
            content: format!("# {}\n\nBody.", title),
            status: PolicyStatus::Approved,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_single_control_scenario() {
        let org = Uuid::new_v4();
        let fw = framework("SOC 2");
        let c1 = control(fw.id, "C1");
        let snapshot = ExportSnapshot::new(
            org,
            fw,
            vec![c1.clone()],
            vec![],
            vec![evidence(org, c1.id, "report.pdf")],
            vec![task(org, c1.id)],
            Utc::now(),
        );

        let summary = snapshot.summary();
        assert_eq!(summary.total_controls, 1);
        assert_eq!(summary.controls[0].code, "C1");
        assert_eq!(summary.controls[0].evidence_count, 1);
        assert_eq!(summary.controls[0].task_count, 1);
    }

    #[test]
    fn test_counts_group_by_control() {
        let org = Uuid::new_v4();
        let fw = framework("SOC 2");
        let a = control(fw.id, "CC1.1");
        let b = control(fw.id, "CC1.2");
        let other = Uuid::new_v4();
        let snapshot = ExportSnapshot::new(
            org,
            fw,
            vec![a.clone(), b.clone()],
            vec![],
            vec![
                evidence(org, a.id, "one.pdf"),
                evidence(org, a.id, "two.pdf"),
                evidence(org, other, "elsewhere.pdf"),
            ],
            vec![task(org, b.id)],
            Utc::now(),
        );

        assert_eq!(snapshot.evidence_count(a.id), 2);
        assert_eq!(snapshot.evidence_count(b.id), 0);
        assert_eq!(snapshot.task_count(b.id), 1);
        assert_eq!(snapshot.evidence_for_control(a.id).count(), 2);
        // Evidence on controls outside the framework still counts toward the total.
        assert_eq!(snapshot.summary().total_evidence, 3);
    }

    #[test]
    fn test_summary_serializes_expected_keys() {
        let org = Uuid::new_v4();
        let fw = framework("ISO 27001");
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let policy = policy(org, fw.id, "Access Control Policy");
        let snapshot = ExportSnapshot::new(org, fw, vec![], vec![policy], vec![], vec![], at);

        let json = serde_json::to_value(snapshot.summary()).unwrap();
        assert_eq!(json["framework"], "ISO 27001");
        assert_eq!(json["export_date"], "2026-02-01T08:00:00Z");
        assert_eq!(json["total_policies"], 1);
        assert!(json["controls"].as_array().unwrap().is_empty());
    }
}
