//! Configuration module for loading simulation parameters.

mod parameters;

pub use parameters::{
    AdapterConfig, ConeConstants, Parameters, RodConstants, SimulationConfig, DEFAULT_PARAMETER_DIR,
};
