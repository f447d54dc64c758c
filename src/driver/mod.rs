//! Simulation driving: fixed sub-stepping per tick, and real-time pacing.

mod realtime;
mod simulation;

pub use realtime::{RealTimeLoop, RunLimit, RunSummary};
pub use simulation::SimulationDriver;
