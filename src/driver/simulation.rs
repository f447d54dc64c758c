//! Tick-based driver advancing a rod and a cone together.
//!
//! One outer tick holds the intensity constant (zero-order hold) over a
//! fixed number of integration sub-steps. Each sub-step advances the rod and
//! then the cone; the two cells share no mutable state, so the order between
//! them has no effect on either trajectory.

use std::sync::Arc;

use crate::adapter::sanitize_intensity;
use crate::config::{Parameters, SimulationConfig};
use crate::error::ConfigError;
use crate::phototransduction::{CascadeIntegrator, CellClass, IntegratorConfig};
use crate::state::{Photoreceptor, SimulationMetrics};

/// Slack, in ticks, when converting a duration to whole ticks
const TICK_ROUNDING_TOLERANCE: f64 = 1e-9;

/// Fixed-rate driver for one rod and one cone
#[derive(Debug, Clone)]
pub struct SimulationDriver {
    rod: Photoreceptor,
    cone: Photoreceptor,
    integrator: CascadeIntegrator,
    config: SimulationConfig,
    tick_count: u64,
    total_steps: u64,
    last_intensity: f64,
}

impl SimulationDriver {
    /// Create a driver, validating the timing against both cells.
    pub fn new(
        rod: Photoreceptor,
        cone: Photoreceptor,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let integrator = CascadeIntegrator::new(IntegratorConfig {
            dt_sec: config.dt_sec,
        });
        integrator.check_stability(&rod)?;
        integrator.check_stability(&cone)?;

        log::debug!(
            "Driver ready: {} sub-steps of {} s per {} s tick",
            config.substeps_per_tick,
            config.dt_sec,
            config.tick_interval_sec
        );

        Ok(Self {
            rod,
            cone,
            integrator,
            config,
            tick_count: 0,
            total_steps: 0,
            last_intensity: 0.0,
        })
    }

    /// Build both cells and the driver from validated parameters
    pub fn from_parameters(params: &Parameters) -> Result<Self, ConfigError> {
        params.validate()?;
        let rod = Photoreceptor::new(CellClass::Rod, Arc::new(params.rod.0.clone()))?;
        let cone = Photoreceptor::new(CellClass::Cone, Arc::new(params.cone.0.clone()))?;
        Self::new(rod, cone, params.simulation)
    }

    /// Default rod, cone and timing
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::from_parameters(&Parameters::default())
    }

    /// Advance both cells by one outer tick at `intensity`, held over every sub-step.
    ///
    /// NaN or negative intensities are treated as darkness.
    pub fn tick(&mut self, intensity: f64) -> SimulationMetrics {
        let intensity = sanitize_intensity(intensity);

        for _ in 0..self.config.substeps_per_tick {
            self.integrator.step(&mut self.rod, intensity);
            self.integrator.step(&mut self.cone, intensity);
        }

        self.tick_count += 1;
        self.total_steps += self.config.substeps_per_tick as u64;
        self.last_intensity = intensity;

        log::trace!(
            "tick {}: I = {:.3}, rod {:.3} pA, cone {:.3} pA",
            self.tick_count,
            intensity,
            self.rod.current_pA(),
            self.cone.current_pA()
        );

        self.metrics()
    }

    /// Run whole ticks at constant intensity until at least `duration_sec` of
    /// simulated time has passed. Returns the metrics after the last tick.
    pub fn advance(&mut self, intensity: f64, duration_sec: f64) -> SimulationMetrics {
        // Tolerate rounding in the division so exact multiples do not gain a tick
        let ticks = (duration_sec / self.config.simulated_tick_sec() - TICK_ROUNDING_TOLERANCE)
            .ceil()
            .max(0.0) as u64;
        for _ in 0..ticks {
            self.tick(intensity);
        }
        self.metrics()
    }

    /// Metrics for the current state
    pub fn metrics(&self) -> SimulationMetrics {
        SimulationMetrics::capture(
            &self.rod,
            &self.cone,
            self.last_intensity,
            self.simulation_time_sec(),
            self.tick_count,
            self.total_steps,
        )
    }

    /// Return both cells to the dark state and zero the clocks
    pub fn reset(&mut self) {
        self.rod.reset();
        self.cone.reset();
        self.tick_count = 0;
        self.total_steps = 0;
        self.last_intensity = 0.0;
    }

    /// Simulated time, derived from the step count so it does not drift
    pub fn simulation_time_sec(&self) -> f64 {
        self.total_steps as f64 * self.config.dt_sec
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn integrator(&self) -> &CascadeIntegrator {
        &self.integrator
    }

    pub fn rod(&self) -> &Photoreceptor {
        &self.rod
    }

    pub fn cone(&self) -> &Photoreceptor {
        &self.cone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_substeps() {
        let mut driver = SimulationDriver::with_defaults().unwrap();
        let m = driver.tick(100.0);
        assert_eq!(m.tick_count, 1);
        assert_eq!(m.total_steps, 20);
        assert!((m.simulation_time_sec - 0.020).abs() < 1e-12);
        assert_eq!(m.intensity, 100.0);
    }

    #[test]
    fn test_tick_matches_manual_steps() {
        let mut driver = SimulationDriver::with_defaults().unwrap();
        let mut rod = Photoreceptor::rod().unwrap();
        let integrator = CascadeIntegrator::default();

        driver.tick(750.0);
        for _ in 0..20 {
            integrator.step(&mut rod, 750.0);
        }

        assert_eq!(driver.rod().state, rod.state);
    }

    #[test]
    fn test_invalid_intensity_treated_as_dark() {
        let mut driver = SimulationDriver::with_defaults().unwrap();
        let m = driver.tick(f64::NAN);
        assert_eq!(m.intensity, 0.0);
        assert_eq!(m.rod.r_star, 0.0);
        assert!((m.rod.current_pA + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_advance_whole_ticks() {
        let mut driver = SimulationDriver::with_defaults().unwrap();
        let m = driver.advance(10.0, 0.05);
        // 0.05 s needs 3 ticks of 20 ms
        assert_eq!(m.tick_count, 3);
        assert_eq!(m.total_steps, 60);
    }

    #[test]
    fn test_advance_exact_multiple_of_tick() {
        // 0.14 / 0.02 evaluates to 7.000000000000001
        let mut driver = SimulationDriver::with_defaults().unwrap();
        let m = driver.advance(10.0, 0.14);
        assert_eq!(m.tick_count, 7);
        assert!((m.simulation_time_sec - 0.14).abs() < 1e-12);

        let m = driver.advance(10.0, 0.0);
        assert_eq!(m.tick_count, 7, "zero duration should not tick");
    }

    #[test]
    fn test_reset() {
        let mut driver = SimulationDriver::with_defaults().unwrap();
        driver.advance(5000.0, 0.2);
        driver.reset();
        let m = driver.metrics();
        assert_eq!(m.tick_count, 0);
        assert_eq!(m.simulation_time_sec, 0.0);
        assert_eq!(m.rod.current_pA, -20.0);
        assert_eq!(m.cone.current_pA, -30.0);
    }

    #[test]
    fn test_rejects_mismatched_timing() {
        let config = SimulationConfig {
            dt_sec: 0.001,
            substeps_per_tick: 20,
            tick_interval_sec: 0.025,
        };
        let result = SimulationDriver::new(
            Photoreceptor::rod().unwrap(),
            Photoreceptor::cone().unwrap(),
            config,
        );
        assert!(matches!(result, Err(ConfigError::TickMismatch { .. })));
    }
}
