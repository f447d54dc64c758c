//! JSON state export for simulation snapshots.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::state::SimulationMetrics;

/// Export format version
pub const EXPORT_VERSION: &str = "1.0.0";

/// Full state export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateExport {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: String,
    /// Simulation metrics snapshot
    pub metrics: SimulationMetrics,
}

impl StateExport {
    fn now(metrics: &SimulationMetrics) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: EXPORT_VERSION.to_string(),
            metrics: metrics.clone(),
        }
    }
}

/// Export current simulation state to JSON
///
/// Creates the exports directory if it doesn't exist.
/// Filename is auto-generated with timestamp: `state_YYYYMMDD_HHMMSS.json`
///
/// Returns the path to the saved JSON file.
pub fn export_state_json(metrics: &SimulationMetrics) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let filename = format!("state_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);

    export_state_json_to(metrics, &path)?;
    Ok(path)
}

/// Export state to a specific file
pub fn export_state_json_to<P: AsRef<Path>>(metrics: &SimulationMetrics, path: P) -> Result<()> {
    let export = StateExport::now(metrics);

    let file = std::fs::File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &export)?;

    log::info!("JSON state exported: {}", path.as_ref().display());
    Ok(())
}
