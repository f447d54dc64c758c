//! Parameter structures and file loading.
//!
//! Each parameter group lives in its own JSON file and falls back to its
//! defaults independently when the file is missing or malformed.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adapter::IntensityMapping;
use crate::error::ConfigError;
use crate::phototransduction::{check_timestep, CellClass, PhysiologicalConstants, DEFAULT_DT_SEC};

/// Default parameter directory
pub const DEFAULT_PARAMETER_DIR: &str = "data/parameters";

/// Relative tolerance for sub-steps × dt matching the tick interval
const TICK_MATCH_TOLERANCE: f64 = 1e-9;

/// Top-level parameters container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Parameters {
    /// Rod cascade constants
    pub rod: RodConstants,
    /// Cone cascade constants
    pub cone: ConeConstants,
    /// Timestep and tick pacing
    pub simulation: SimulationConfig,
    /// Input/output mapping
    pub adapter: AdapterConfig,
}

impl Parameters {
    /// Load parameters from the default directory, or use defaults if files don't exist
    pub fn load_or_default() -> Self {
        Self::load_from_dir(DEFAULT_PARAMETER_DIR)
    }

    /// Load parameters from a specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            rod: load_json_or_default(dir.join("rod.json"), "rod"),
            cone: load_json_or_default(dir.join("cone.json"), "cone"),
            simulation: load_json_or_default(dir.join("simulation.json"), "simulation"),
            adapter: load_json_or_default(dir.join("adapter.json"), "adapter"),
        }
    }

    /// Load a single JSON file holding every group, failing on any error
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let params: Self = serde_json::from_str(&contents)?;
        Ok(params)
    }

    /// Write every group to a single JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Check constants, timing and mapping before anything is constructed
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rod
            .0
            .validate()
            .map_err(|source| ConfigError::constants(CellClass::Rod, source))?;
        self.cone
            .0
            .validate()
            .map_err(|source| ConfigError::constants(CellClass::Cone, source))?;

        self.simulation.validate()?;
        for (cell, constants) in [(CellClass::Rod, &self.rod.0), (CellClass::Cone, &self.cone.0)] {
            self.simulation.check_stability(cell, constants)?;
        }

        IntensityMapping::new(&self.adapter)?;
        Ok(())
    }
}

fn load_json_or_default<T, P>(path: P, label: &str) -> T
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    match std::fs::read_to_string(path.as_ref()) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(params) => {
                log::info!("Loaded {} parameters from {:?}", label, path.as_ref());
                params
            }
            Err(e) => {
                log::warn!("Failed to parse {} parameters: {}, using defaults", label, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("{} parameters file not found, using defaults", label);
            T::default()
        }
    }
}

/// Rod constants, defaulting to the rod calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RodConstants(pub PhysiologicalConstants);

impl Default for RodConstants {
    fn default() -> Self {
        Self(PhysiologicalConstants::rod())
    }
}

/// Cone constants, defaulting to the cone calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConeConstants(pub PhysiologicalConstants);

impl Default for ConeConstants {
    fn default() -> Self {
        Self(PhysiologicalConstants::cone())
    }
}

/// Timestep and real-time pacing
///
/// `substeps_per_tick × dt_sec` must equal `tick_interval_sec` for simulated
/// time to advance at the wall-clock rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Integration timestep (s)
    pub dt_sec: f64,
    /// Integration steps per cell per outer tick
    pub substeps_per_tick: usize,
    /// Outer tick interval (s); the intensity is resampled once per tick
    pub tick_interval_sec: f64,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt_sec.is_finite() && self.dt_sec > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.dt_sec));
        }
        if self.substeps_per_tick == 0 {
            return Err(ConfigError::NoSubsteps);
        }

        let covered_sec = self.substeps_per_tick as f64 * self.dt_sec;
        let mismatch = (covered_sec - self.tick_interval_sec).abs();
        if !(mismatch <= TICK_MATCH_TOLERANCE * self.tick_interval_sec.abs().max(covered_sec)) {
            return Err(ConfigError::TickMismatch {
                substeps: self.substeps_per_tick,
                dt_sec: self.dt_sec,
                covered_sec,
                tick_interval_sec: self.tick_interval_sec,
            });
        }

        if self.dt_sec != DEFAULT_DT_SEC {
            log::warn!(
                "Timestep {} s differs from the calibrated {} s; stability is not re-derived",
                self.dt_sec,
                DEFAULT_DT_SEC
            );
        }
        Ok(())
    }

    /// Reject timesteps coarse relative to the fastest time constant of `constants`
    pub fn check_stability(
        &self,
        cell: CellClass,
        constants: &PhysiologicalConstants,
    ) -> Result<(), ConfigError> {
        check_timestep(self.dt_sec, cell, constants)
    }

    /// Simulated seconds per tick
    pub fn simulated_tick_sec(&self) -> f64 {
        self.substeps_per_tick as f64 * self.dt_sec
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_sec: 0.001,            // 1 ms
            substeps_per_tick: 20,    // 20 × 1 ms
            tick_interval_sec: 0.020, // 20 ms, 50 Hz
        }
    }
}

/// Input mapping settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// log10 of the intensity at the bottom of the input range
    pub log10_min_intensity: f64,
    /// Decades spanned by the input range
    pub log10_intensity_span: f64,
    /// Full-scale raw reading
    pub raw_input_max: u16,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            // 0.1 … 100,000 events/s
            log10_min_intensity: -1.0,
            log10_intensity_span: 6.0,
            // 10-bit ADC
            raw_input_max: 1023,
        }
    }
}
