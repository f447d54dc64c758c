//! Unified simulation metrics for logging and export.
//!
//! One `SimulationMetrics` value is produced per outer tick. It aggregates
//! both cells' currents and cascade variables together with the display
//! mapping, in a form that serializes directly to CSV rows, JSON snapshots
//! and serial log lines.

use serde::{Deserialize, Serialize};

use crate::adapter::{blend, normalized_response, pwm_duty, VisionRegime};
use crate::state::Photoreceptor;

/// Per-cell slice of the metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMetrics {
    /// Membrane current (pA)
    pub current_pA: f64,
    /// Display response in [0, 1] (0 dark, 1 saturated)
    pub normalized_response: f64,
    pub r_star: f64,
    pub e_star: f64,
    pub cgmp_uM: f64,
    pub ca_uM: f64,
}

impl CellMetrics {
    pub fn from_cell(cell: &Photoreceptor) -> Self {
        let s = &cell.state;
        Self {
            current_pA: s.current_pA,
            normalized_response: normalized_response(s.current_pA, cell.constants().j_dark_pA),
            r_star: s.r_star,
            e_star: s.e_star,
            cgmp_uM: s.cgmp_uM,
            ca_uM: s.ca_uM,
        }
    }
}

/// Snapshot of the simulation after one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    // === Timing ===
    /// Simulated time in seconds
    pub simulation_time_sec: f64,
    /// Outer ticks completed
    pub tick_count: u64,
    /// Integration steps per cell completed
    pub total_steps: u64,

    // === Input ===
    /// Intensity held over the last tick (events/s)
    pub intensity: f64,

    // === Cells ===
    pub rod: CellMetrics,
    pub cone: CellMetrics,

    // === Display ===
    pub rod_weight: f64,
    pub cone_weight: f64,
    /// Intensity-weighted blend of the normalised responses
    pub combined_response: f64,
    pub regime: VisionRegime,
    /// LED duty cycle for the combined response
    pub pwm_duty: u8,
}

impl SimulationMetrics {
    /// Assemble metrics from the two cells and the intensity they were driven with
    pub fn capture(
        rod: &Photoreceptor,
        cone: &Photoreceptor,
        intensity: f64,
        simulation_time_sec: f64,
        tick_count: u64,
        total_steps: u64,
    ) -> Self {
        let rod = CellMetrics::from_cell(rod);
        let cone = CellMetrics::from_cell(cone);
        let blended = blend(rod.normalized_response, cone.normalized_response, intensity);

        Self {
            simulation_time_sec,
            tick_count,
            total_steps,
            intensity,
            rod,
            cone,
            rod_weight: blended.rod_weight,
            cone_weight: blended.cone_weight,
            combined_response: blended.combined,
            regime: blended.regime,
            pwm_duty: pwm_duty(blended.combined),
        }
    }

    pub fn print_summary(&self) {
        println!("=== Simulation t = {:.3} s (tick {}) ===", self.simulation_time_sec, self.tick_count);
        println!("Intensity:          {:.3} R*/s", self.intensity);
        println!(
            "Rod current:        {:.3} pA (response {:.1}%)",
            self.rod.current_pA,
            self.rod.normalized_response * 100.0
        );
        println!(
            "Cone current:       {:.3} pA (response {:.1}%)",
            self.cone.current_pA,
            self.cone.normalized_response * 100.0
        );
        println!(
            "Blend:              rod {:.2} / cone {:.2} ({:?})",
            self.rod_weight, self.cone_weight, self.regime
        );
        println!(
            "Combined response:  {:.1}% (PWM {})",
            self.combined_response * 100.0,
            self.pwm_duty
        );
    }
}
