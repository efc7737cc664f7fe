//! Built-in framework and control catalog used to seed a fresh database.

use serde::Deserialize;

use crate::models::ControlSeverity;

const LIBRARY_JSON: &str = include_str!("../../data/control_library.json");

#[derive(Debug, Clone, Deserialize)]
pub struct ControlLibrary {
    pub frameworks: Vec<FrameworkSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameworkSeed {
    pub name: String,
    pub version: String,
    pub description: String,
    pub controls: Vec<ControlSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlSeed {
    pub control_code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: ControlSeverity,
    pub guidance_text: String,
    pub evidence_guidance: String,
}

impl ControlLibrary {
    /// Parses the embedded catalog.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        serde_json::from_str(LIBRARY_JSON)
    }

    pub fn control_count(&self) -> usize {
        self.frameworks.iter().map(|f| f.controls.len()).sum()
    }
}
