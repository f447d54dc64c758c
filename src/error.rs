//! Error types for construction-time configuration.
//!
//! The cascade itself never fails at runtime: every stage is followed by a
//! range clamp. Everything that *can* go wrong is a bad constant or a bad
//! timing configuration, and is rejected before the first step.

use thiserror::Error;

use crate::phototransduction::CellClass;

/// A single physiological constant violates its physical domain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstantsError {
    /// Constant must be finite and strictly positive
    #[error("`{name}` must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    /// Constant must be finite and non-negative
    #[error("`{name}` must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    /// Exchanger current fraction outside [0, 1]
    #[error("calcium current fraction f_Ca must lie in [0, 1], got {0}")]
    CalciumFractionOutOfRange(f64),

    /// Dark calcium must sit above the extrusion floor (caRatio denominator)
    #[error("dark calcium {c_dark_uM} μM must exceed the extrusion floor {c0_uM} μM")]
    CalciumFloorNotBelowDark { c_dark_uM: f64, c0_uM: f64 },

    /// Dark cGMP must lie inside the cGMP clamp range
    #[error("dark cGMP {g_dark_uM} μM lies outside the clamp range [{min_uM}, {max_uM}] μM")]
    DarkCgmpOutOfRange {
        g_dark_uM: f64,
        min_uM: f64,
        max_uM: f64,
    },

    /// Dark calcium must lie below the calcium ceiling
    #[error("dark calcium {c_dark_uM} μM exceeds the calcium ceiling {max_uM} μM")]
    DarkCalciumAboveCeiling { c_dark_uM: f64, max_uM: f64 },

    /// Dark synthesis α(c_dark) must equal dark hydrolysis β_dark·g_dark
    #[error(
        "dark state is not steady: synthesis {synthesis_uM_per_sec} μM/s \
         vs hydrolysis {hydrolysis_uM_per_sec} μM/s"
    )]
    DarkStateUnbalanced {
        synthesis_uM_per_sec: f64,
        hydrolysis_uM_per_sec: f64,
    },
}

/// Configuration errors, raised when parameters are validated.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid constants for one cell class
    #[error("invalid {cell} constants: {source}")]
    Constants {
        cell: CellClass,
        #[source]
        source: ConstantsError,
    },

    /// Integration timestep is not positive and finite
    #[error("integration timestep must be finite and positive, got {0} s")]
    InvalidTimestep(f64),

    /// Timestep too coarse for the fastest time constant of a cell
    #[error(
        "timestep {dt_sec} s is too coarse for the {cell} cascade \
         (fastest time constant {fastest_sec} s, limit {limit_sec} s)"
    )]
    UnstableTimestep {
        cell: CellClass,
        dt_sec: f64,
        fastest_sec: f64,
        limit_sec: f64,
    },

    /// Tick must contain at least one sub-step
    #[error("a tick must contain at least one sub-step")]
    NoSubsteps,

    /// Sub-steps × dt must equal the outer tick interval
    #[error(
        "{substeps} sub-steps of {dt_sec} s cover {covered_sec} s, \
         but the tick interval is {tick_interval_sec} s"
    )]
    TickMismatch {
        substeps: usize,
        dt_sec: f64,
        covered_sec: f64,
        tick_interval_sec: f64,
    },

    /// Intensity mapping cannot produce a usable log-scale range
    #[error("invalid intensity mapping: {0}")]
    InvalidMapping(String),

    /// I/O errors (parameter files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parameter file parse errors
    #[error("parameter parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Attach a cell class to a constants violation.
    pub fn constants(cell: CellClass, source: ConstantsError) -> Self {
        ConfigError::Constants { cell, source }
    }
}
