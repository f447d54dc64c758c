//! Photoreceptor Sim - rod and cone phototransduction simulation
//!
//! This library integrates a reduced five-stage kinetic model of the
//! phototransduction cascade (R* → E* → cGMP → Ca2+ → current) for one rod
//! and one cone, paced in real time and mapped to display signals.

// Allow non-snake-case for unit suffixes in field names (uM, pA, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod adapter;
pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod phototransduction;
pub mod state;

pub use adapter::{
    ConstantIntensity, IntensityMapping, IntensitySource, ResponseSink, SerialLogger, SliderSweep,
};
pub use config::{Parameters, SimulationConfig};
pub use driver::{RealTimeLoop, RunLimit, RunSummary, SimulationDriver};
pub use error::{ConfigError, ConstantsError};
pub use phototransduction::{
    half_saturation_intensity, CascadeIntegrator, CellClass, IntegratorConfig,
    PhysiologicalConstants, SteadyState,
};
pub use state::{Photoreceptor, PhotoreceptorState, SimulationMetrics};
