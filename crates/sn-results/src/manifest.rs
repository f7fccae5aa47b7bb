//! Machine-readable run record.

use crate::ResultsResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub solver_version: String,
    pub kind: RunKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunKind {
    Steady,
    Transient { dt_s: f64, t_end_s: f64, steps: usize },
}

/// Content hash of the three input files plus the solver version, so
/// identical inputs map to identical run ids.
pub fn compute_run_id(
    settings_text: &str,
    nodes_text: &str,
    elements_text: &str,
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(settings_text.as_bytes());
    hasher.update(nodes_text.as_bytes());
    hasher.update(elements_text.as_bytes());
    hasher.update(solver_version.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl RunManifest {
    pub fn new(run_id: String, kind: RunKind) -> Self {
        Self {
            run_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
            kind,
        }
    }

    pub fn save(&self, dir: &Path) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join("manifest.json"), json)?;
        Ok(())
    }
}
