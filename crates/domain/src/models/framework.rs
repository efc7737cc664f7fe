//! Compliance framework model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A compliance standard such as SOC 2, ISO 27001 or GDPR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Framework {
    /// Framework name as used in artifact file names.
    pub fn file_name_component(&self) -> String {
        self.name.replace(' ', "_")
    }
}
