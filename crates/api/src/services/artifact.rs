//! Serializes an export snapshot into a ZIP archive or an HTML report.

use domain::models::{artifact_file_name, ExportType};
use domain::services::ExportSnapshot;
use shared::markdown::{escape_html, render};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::storage::{BlobStore, StorageError};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read evidence: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize summary: {0}")]
    Summary(#[from] serde_json::Error),
}

/// A finished export file, not yet stored.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub async fn build(
    snapshot: &ExportSnapshot,
    export_type: ExportType,
    evidence_store: &dyn BlobStore,
) -> Result<Artifact, ArtifactError> {
    let file_name = artifact_file_name(
        snapshot.organization_id,
        &snapshot.framework.name,
        snapshot.taken_at,
        export_type,
    );

    let bytes = match export_type {
        ExportType::Zip => build_zip(snapshot, evidence_store).await?,
        ExportType::Html => build_html(snapshot).into_bytes(),
    };

    Ok(Artifact { file_name, bytes })
}

/// Reduces an entry name to its base name so entries cannot escape their folder.
fn sanitize_entry_name(name: &str, fallback: &str) -> String {
    let normalized = name.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Entry names already written to one archive.
#[derive(Default)]
struct EntryNames(HashSet<String>);

impl EntryNames {
    /// Returns `folder/name`, prefixing `tag` (and then a counter) when the
    /// name is already taken.
    fn claim(&mut self, folder: &str, name: &str, tag: &str) -> String {
        let mut candidate = format!("{}/{}", folder, name);
        if self.0.contains(&candidate) {
            candidate = format!("{}/{}_{}", folder, tag, name);
        }
        let base = candidate.clone();
        let mut n = 2;
        while self.0.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        self.0.insert(candidate.clone());
        candidate
    }
}

async fn build_zip(
    snapshot: &ExportSnapshot,
    evidence_store: &dyn BlobStore,
) -> Result<Vec<u8>, ArtifactError> {
    let summary = serde_json::to_vec_pretty(&snapshot.summary())?;

    // Evidence bytes are read before the writer is opened so no await
    // happens while the archive is borrowed.
    let mut evidence_files = Vec::with_capacity(snapshot.evidence.len());
    for item in &snapshot.evidence {
        match evidence_store.get(&item.storage_location).await {
            Ok(data) => evidence_files.push((item, data)),
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(
                    evidence_id = %item.id,
                    location = %item.storage_location,
                    "Evidence file missing, skipped from export"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        let mut names = EntryNames::default();

        zip.start_file("summary.json", options)?;
        zip.write_all(&summary)?;

        for policy in &snapshot.policies {
            let base = sanitize_entry_name(&policy.title, &policy.id.to_string());
            let entry = names.claim("policies", &format!("{}.md", base), &format!("v{}", policy.version));
            zip.start_file(entry, options)?;
            zip.write_all(policy.content.as_bytes())?;
        }

        for (item, data) in &evidence_files {
            let base = sanitize_entry_name(&item.file_name, &item.id.to_string());
            let entry = names.claim("evidence", &base, &format!("v{}", item.version));
            zip.start_file(entry, options)?;
            zip.write_all(data)?;
        }

        zip.finish()?;
    }

    Ok(buffer)
}

const REPORT_STYLE: &str = "\
body { font-family: Arial, sans-serif; max-width: 900px; margin: 0 auto; padding: 20px; }
h1 { color: #1a1a1a; border-bottom: 2px solid #3b82f6; padding-bottom: 10px; }
h2 { color: #374151; margin-top: 30px; }
h3 { color: #4b5563; }
.control { background: #f9fafb; padding: 15px; margin: 10px 0; border-radius: 8px; border-left: 4px solid #3b82f6; }
.control-code { font-weight: bold; color: #3b82f6; }
.policy { background: #f0f9ff; padding: 15px; margin: 10px 0; border-radius: 8px; }
.evidence { background: #f0fdf4; padding: 10px; margin: 5px 0; border-radius: 4px; }
.meta { color: #6b7280; font-size: 0.9em; }
";

fn build_html(snapshot: &ExportSnapshot) -> String {
    let framework = escape_html(&snapshot.framework.name);
    let mut html = String::with_capacity(16 * 1024);

    // Writing to a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Compliance Audit Report - {framework}</title>\n\
         <style>\n{REPORT_STYLE}</style>\n</head>\n<body>\n\
         <h1>Compliance Audit Report</h1>\n\
         <p class=\"meta\">Framework: {framework} | Generated: {generated}</p>\n\
         <h2>Summary</h2>\n<ul>\n\
         <li>Total Controls: {controls}</li>\n\
         <li>Policies: {policies}</li>\n\
         <li>Evidence Items: {evidence}</li>\n\
         </ul>\n<h2>Controls</h2>\n",
        generated = snapshot.taken_at.format("%Y-%m-%d %H:%M UTC"),
        controls = snapshot.controls.len(),
        policies = snapshot.policies.len(),
        evidence = snapshot.evidence.len(),
    );

    for control in &snapshot.controls {
        let _ = write!(
            html,
            "<div class=\"control\">\n\
             <span class=\"control-code\">{code}</span> - {title}\n\
             <p>{description}</p>\n\
             <p class=\"meta\">Evidence: {evidence} | Tasks: {tasks}</p>\n",
            code = escape_html(&control.control_code),
            title = escape_html(&control.title),
            description = escape_html(&control.description),
            evidence = snapshot.evidence_count(control.id),
            tasks = snapshot.task_count(control.id),
        );
        for item in snapshot.evidence_for_control(control.id) {
            let _ = writeln!(
                html,
                "<div class=\"evidence\">{} (v{}) - Status: {}</div>",
                escape_html(&item.file_name),
                item.version,
                item.status
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("<h2>Policies</h2>\n");
    for policy in &snapshot.policies {
        let _ = write!(
            html,
            "<div class=\"policy\">\n<h3>{title}</h3>\n\
             <p class=\"meta\">Status: {status} | Version: {version}</p>\n\
             {body}</div>\n",
            title = escape_html(&policy.title),
            status = policy.status,
            version = policy.version,
            body = render(&policy.content),
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use chrono::{TimeZone, Utc};
    use domain::models::{
        Control, ControlSeverity, Evidence, EvidenceStatus, Framework, Policy, PolicyStatus, Task,
        TaskPriority, TaskStatus,
    };
    use std::io::Read;
    use uuid::Uuid;

    fn framework() -> Framework {
        Framework {
            id: Uuid::new_v4(),
            name: "SOC 2".into(),
            version: "2017".into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn control(framework_id: Uuid, code: &str, title: &str) -> Control {
        Control {
            id: Uuid::new_v4(),
            framework_id,
            control_code: code.into(),
            title: title.into(),
            description: format!("{} description", code),
            category: None,
            severity: ControlSeverity::High,
            guidance_text: None,
            evidence_guidance: None,
            created_at: Utc::now(),
        }
    }

    fn evidence(org: Uuid, control_id: Uuid, file_name: &str, location: &str, version: i32) -> Evidence {
        Evidence {
            id: Uuid::new_v4(),
            organization_id: org,
            control_id,
            file_name: file_name.into(),
            storage_location: location.into(),
            file_hash: "0".repeat(64),
            file_size: 0,
            mime_type: None,
            description: None,
            version,
            status: EvidenceStatus::Accepted,
            uploaded_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(org: Uuid, control_id: Uuid) -> Task {
        Task {
            id: Uuid::new_v4(),
            organization_id: org,
            control_id,
            owner_id: None,
            title: "Collect screenshots".into(),
            description: None,
            due_date: None,
            status: TaskStatus::Completed,
            priority: TaskPriority::Medium,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn policy(org: Uuid, framework_id: Uuid, title: &str, content: &str) -> Policy {
        Policy {
            id: Uuid::new_v4(),
            organization_id: org,
            framework_id: Some(framework_id),
            title: title.into(),
            content: content.into(),
            status: PolicyStatus::Approved,
            version: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn store() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        (dir, storage)
    }

    fn read_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_zip_single_control_scenario() {
        let (_dir, storage) = store().await;
        let org = Uuid::new_v4();
        let fw = framework();
        let c1 = control(fw.id, "C1", "Access reviews");
        let location = storage.put(&format!("{}/a_report.pdf", org), b"%PDF").await.unwrap();
        let taken_at = Utc.with_ymd_and_hms(2026, 5, 4, 3, 2, 1).unwrap();

        let snapshot = ExportSnapshot::new(
            org,
            fw,
            vec![c1.clone()],
            vec![],
            vec![evidence(org, c1.id, "report.pdf", &location, 1)],
            vec![task(org, c1.id)],
            taken_at,
        );

        let artifact = build(&snapshot, ExportType::Zip, &storage).await.unwrap();
        assert_eq!(
            artifact.file_name,
            format!("audit_export_{}_SOC_2_20260504_030201.zip", org)
        );

        let entries = read_entries(&artifact.bytes);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["summary.json", "evidence/report.pdf"]);

        let summary: serde_json::Value = serde_json::from_slice(&entries[0].1).unwrap();
        assert_eq!(summary["framework"], "SOC 2");
        assert_eq!(summary["total_controls"], 1);
        assert_eq!(summary["controls"][0]["code"], "C1");
        assert_eq!(summary["controls"][0]["evidence_count"], 1);
        assert_eq!(summary["controls"][0]["task_count"], 1);
        assert_eq!(entries[1].1, b"%PDF");
    }

    #[tokio::test]
    async fn test_zip_skips_missing_evidence() {
        let (_dir, storage) = store().await;
        let org = Uuid::new_v4();
        let fw = framework();
        let c1 = control(fw.id, "C1", "Access reviews");
        let present = storage.put("org/present.txt", b"here").await.unwrap();

        let snapshot = ExportSnapshot::new(
            org,
            fw,
            vec![c1.clone()],
            vec![],
            vec![
                evidence(org, c1.id, "present.txt", &present, 1),
                evidence(org, c1.id, "gone.txt", "org/gone.txt", 1),
            ],
            vec![],
            Utc::now(),
        );

        let artifact = build(&snapshot, ExportType::Zip, &storage).await.unwrap();
        let entries = read_entries(&artifact.bytes);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(names, vec!["summary.json", "evidence/present.txt"]);
        let summary: serde_json::Value = serde_json::from_slice(&entries[0].1).unwrap();
        assert_eq!(summary["total_evidence"], 2);
    }

    #[tokio::test]
    async fn test_zip_entry_names_are_sanitized_and_unique() {
        let (_dir, storage) = store().await;
        let org = Uuid::new_v4();
        let fw = framework();
        let c1 = control(fw.id, "C1", "Access reviews");
        let v1 = storage.put("org/v1", b"one").await.unwrap();
        let v2 = storage.put("org/v2", b"two").await.unwrap();

        let snapshot = ExportSnapshot::new(
            org,
            fw.clone(),
            vec![c1.clone()],
            vec![policy(org, fw.id, "../../etc/Access Policy", "# Access")],
            vec![
                evidence(org, c1.id, "report.pdf", &v1, 1),
                evidence(org, c1.id, "report.pdf", &v2, 2),
            ],
            vec![],
            Utc::now(),
        );

        let artifact = build(&snapshot, ExportType::Zip, &storage).await.unwrap();
        let names: Vec<String> = read_entries(&artifact.bytes)
            .into_iter()
            .map(|(n, _)| n)
            .collect();

        assert_eq!(
            names,
            vec![
                "summary.json",
                "policies/Access Policy.md",
                "evidence/report.pdf",
                "evidence/v2_report.pdf",
            ]
        );
    }

    #[tokio::test]
    async fn test_html_report_sections_in_order() {
        let (_dir, storage) = store().await;
        let org = Uuid::new_v4();
        let fw = framework();
        let c1 = control(fw.id, "CC6.1", "Logical <Access>");
        let snapshot = ExportSnapshot::new(
            org,
            fw.clone(),
            vec![c1.clone()],
            vec![policy(org, fw.id, "Access Policy", "# Scope\n\n<script>alert(1)</script>")],
            vec![evidence(org, c1.id, "mfa.png", "org/mfa.png", 3)],
            vec![task(org, c1.id)],
            Utc.with_ymd_and_hms(2026, 1, 2, 9, 30, 0).unwrap(),
        );

        let artifact = build(&snapshot, ExportType::Html, &storage).await.unwrap();
        assert!(artifact.file_name.ends_with(".html"));
        let html = String::from_utf8(artifact.bytes).unwrap();

        assert!(html.contains("Framework: SOC 2 | Generated: 2026-01-02 09:30 UTC"));
        assert!(html.contains("<li>Total Controls: 1</li>"));
        assert!(html.contains("Logical &lt;Access&gt;"));
        assert!(html.contains("mfa.png (v3) - Status: Accepted"));
        assert!(html.contains("Evidence: 1 | Tasks: 1"));
        assert!(html.contains("Status: Approved | Version: 2"));
        assert!(html.contains("<h1>Scope</h1>"));
        assert!(!html.contains("<script>"));

        let summary = html.find("<h2>Summary</h2>").unwrap();
        let controls = html.find("<h2>Controls</h2>").unwrap();
        let policies = html.find("<h2>Policies</h2>").unwrap();
        assert!(summary < controls && controls < policies);
    }

    #[test]
    fn test_sanitize_entry_name() {
        assert_eq!(sanitize_entry_name("../../x.txt", "f"), "x.txt");
        assert_eq!(sanitize_entry_name("a\\b\\c.txt", "f"), "c.txt");
        assert_eq!(sanitize_entry_name("..", "fallback"), "fallback");
        assert_eq!(sanitize_entry_name("", "fallback"), "fallback");
    }
}
