//! CSV time-series export for simulation metrics.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::adapter::ResponseSink;
use crate::state::SimulationMetrics;

/// Record for CSV time-series export
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesRecord {
    /// Simulation time (seconds)
    pub time_sec: f64,
    /// Light intensity (events/s)
    pub intensity: f64,
    /// Rod current (pA)
    pub rod_current_pA: f64,
    /// Rod cGMP (uM)
    pub rod_cgmp_uM: f64,
    /// Rod Ca2+ (uM)
    pub rod_ca_uM: f64,
    /// Cone current (pA)
    pub cone_current_pA: f64,
    /// Cone cGMP (uM)
    pub cone_cgmp_uM: f64,
    /// Cone Ca2+ (uM)
    pub cone_ca_uM: f64,
    /// Normalised rod response
    pub rod_response: f64,
    /// Normalised cone response
    pub cone_response: f64,
    /// Intensity-weighted blend
    pub combined_response: f64,
}

impl From<&SimulationMetrics> for TimeSeriesRecord {
    fn from(m: &SimulationMetrics) -> Self {
        Self {
            time_sec: m.simulation_time_sec,
            intensity: m.intensity,
            rod_current_pA: m.rod.current_pA,
            rod_cgmp_uM: m.rod.cgmp_uM,
            rod_ca_uM: m.rod.ca_uM,
            cone_current_pA: m.cone.current_pA,
            cone_cgmp_uM: m.cone.cgmp_uM,
            cone_ca_uM: m.cone.ca_uM,
            rod_response: m.rod.normalized_response,
            cone_response: m.cone.normalized_response,
            combined_response: m.combined_response,
        }
    }
}

/// CSV exporter for time-series data
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Sample interval in seconds
    sample_interval_sec: f64,
    /// Last sample time
    last_sample_time: f64,
    /// Path to output file
    path: PathBuf,
    /// Rows written
    records: u64,
}

impl CsvExporter {
    /// Create a new CSV exporter with the given sample interval
    ///
    /// Creates the exports directory if it doesn't exist.
    /// Filename is auto-generated with timestamp.
    pub fn new(sample_interval_sec: f64) -> Result<Self> {
        let dir = PathBuf::from("exports");
        std::fs::create_dir_all(&dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("timeseries_{}.csv", timestamp));

        Self::to_path(path, sample_interval_sec)
    }

    /// Create an exporter writing to a specific file
    pub fn to_path<P: AsRef<Path>>(path: P, sample_interval_sec: f64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval_sec,
            last_sample_time: f64::NEG_INFINITY, // Ensure first sample is recorded
            path,
            records: 0,
        })
    }

    /// Record a sample if the interval has elapsed
    pub fn maybe_record(&mut self, metrics: &SimulationMetrics) -> Result<bool> {
        let time = metrics.simulation_time_sec;

        // Tolerate accumulated rounding in the simulated clock
        if time - self.last_sample_time >= self.sample_interval_sec - 1e-9 {
            self.record(metrics)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Force record a sample regardless of interval
    pub fn record(&mut self, metrics: &SimulationMetrics) -> Result<()> {
        let record = TimeSeriesRecord::from(metrics);
        self.writer.serialize(&record)?;
        self.last_sample_time = metrics.simulation_time_sec;
        self.records += 1;
        Ok(())
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!(
            "CSV export completed: {} ({} rows)",
            self.path.display(),
            self.records
        );
        Ok(self.path)
    }

    /// Get the output path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Rows written so far
    pub fn records(&self) -> u64 {
        self.records
    }
}

impl ResponseSink for CsvExporter {
    fn consume(&mut self, metrics: &SimulationMetrics) -> Result<()> {
        self.maybe_record(metrics)?;
        Ok(())
    }
}
