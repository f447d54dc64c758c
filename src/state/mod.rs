//! State management for the photoreceptor simulation.
//!
//! Contains the per-cell cascade state and the per-tick metrics snapshot.

mod metrics;
mod photoreceptor;

pub use metrics::{CellMetrics, SimulationMetrics};
pub use photoreceptor::{Photoreceptor, PhotoreceptorState};
