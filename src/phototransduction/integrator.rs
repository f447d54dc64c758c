//! Fixed-step forward-Euler integration of the phototransduction cascade.
//!
//! One call advances a photoreceptor by exactly one timestep as a single
//! sequential sweep R* → E* → cGMP → Ca → J. Each stage reads the values the
//! previous stages wrote *in the same call*; only the cGMP synthesis term
//! uses the calcium level from before the sweep. Reordering the stages changes
//! the trajectory.
//!
//! Every integrated variable is clamped after its update, so any finite,
//! non-negative intensity keeps the state physically bounded. There is no
//! step-size control: the timestep must stay small relative to the fastest
//! time constant `min(τ_R, τ_E, 1/γ_Ca)`.

use serde::Serialize;

use super::constants::{
    CellClass, PhysiologicalConstants, CALCIUM_MAX_UM, CGMP_MAX_UM, CGMP_MIN_UM,
};
use crate::error::ConfigError;
use crate::state::{Photoreceptor, PhotoreceptorState};

/// Reference timestep (s)
pub const DEFAULT_DT_SEC: f64 = 0.001;

/// Largest allowed ratio of timestep to the fastest cascade time constant
pub const MAX_DT_FRACTION_OF_FASTEST: f64 = 0.1;

/// Configuration for the cascade integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorConfig {
    /// Integration timestep in seconds
    pub dt_sec: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            dt_sec: DEFAULT_DT_SEC, // 1 ms
        }
    }
}

/// Forward-Euler integrator for one photoreceptor cascade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeIntegrator {
    pub config: IntegratorConfig,
}

impl CascadeIntegrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self { config }
    }

    /// Integrator with the given timestep
    pub fn with_dt(dt_sec: f64) -> Self {
        Self::new(IntegratorConfig { dt_sec })
    }

    /// Check the timestep against a cell's fastest time constant.
    pub fn check_stability(&self, cell: &Photoreceptor) -> Result<(), ConfigError> {
        check_timestep(self.config.dt_sec, cell.class(), cell.constants())
    }

    /// Advance one photoreceptor by one timestep at light intensity `intensity`
    /// (activation events/s).
    ///
    /// The intensity must be finite and non-negative; it is not validated here.
    #[inline]
    pub fn step(&self, cell: &mut Photoreceptor, intensity: f64) {
        let weights = cell.weights();
        let (constants, state) = cell.split_mut();
        advance(state, constants, weights.cng, weights.exchanger, self.config.dt_sec, intensity);
    }

    /// Run as many steps as cover `duration_sec` at constant intensity.
    ///
    /// Returns the number of steps taken.
    pub fn run(&self, cell: &mut Photoreceptor, intensity: f64, duration_sec: f64) -> usize {
        let n_steps = (duration_sec / self.config.dt_sec).round().max(0.0) as usize;
        for _ in 0..n_steps {
            self.step(cell, intensity);
        }
        n_steps
    }

    /// Rates and fluxes the next step would use, without advancing the state
    pub fn diagnostics(&self, cell: &Photoreceptor, intensity: f64) -> CascadeDiagnostics {
        CascadeDiagnostics::evaluate(cell, intensity)
    }
}

impl Default for CascadeIntegrator {
    fn default() -> Self {
        Self::new(IntegratorConfig::default())
    }
}

/// Reject timesteps that are not positive, or coarse relative to the fastest
/// time constant of `constants`.
pub fn check_timestep(
    dt_sec: f64,
    cell: CellClass,
    constants: &PhysiologicalConstants,
) -> Result<(), ConfigError> {
    if !(dt_sec.is_finite() && dt_sec > 0.0) {
        return Err(ConfigError::InvalidTimestep(dt_sec));
    }

    let fastest_sec = constants.fastest_time_constant_sec();
    let limit_sec = fastest_sec * MAX_DT_FRACTION_OF_FASTEST;
    if dt_sec > limit_sec {
        return Err(ConfigError::UnstableTimestep {
            cell,
            dt_sec,
            fastest_sec,
            limit_sec,
        });
    }
    Ok(())
}

/// One forward-Euler sweep over the five cascade stages.
#[inline]
fn advance(
    state: &mut PhotoreceptorState,
    c: &PhysiologicalConstants,
    w_cng: f64,
    w_ex: f64,
    dt: f64,
    intensity: f64,
) {
    // 1. Pigment activation and shutoff
    let dr_dt = intensity - state.r_star / c.tau_r_sec;
    state.r_star = (state.r_star + dr_dt * dt).max(0.0);

    // 2. Enzyme activation from the updated R*
    let de_dt = c.gain * state.r_star - state.e_star / c.tau_e_sec;
    state.e_star = (state.e_star + de_dt * dt).max(0.0);

    // 3. cGMP turnover: synthesis sees the previous Ca, hydrolysis the updated E*
    let alpha = c.synthesis_rate_uM_per_sec(state.ca_uM);
    let beta = c.hydrolysis_rate_per_sec(state.e_star);
    let dg_dt = alpha - beta * state.cgmp_uM;
    state.cgmp_uM = (state.cgmp_uM + dg_dt * dt).clamp(CGMP_MIN_UM, CGMP_MAX_UM);

    // 4. Calcium influx through open channels, first-order extrusion to c0
    let open = c.channel_open_fraction(state.cgmp_uM);
    let influx = c.gamma_ca_per_sec * (c.c_dark_uM - c.c0_uM) * open;
    let efflux = c.gamma_ca_per_sec * (state.ca_uM - c.c0_uM);
    state.ca_uM = (state.ca_uM + (influx - efflux) * dt).clamp(c.c0_uM, CALCIUM_MAX_UM);

    // 5. Current readout
    let ca_ratio = c.calcium_ratio(state.ca_uM);
    state.current_pA = -c.j_dark_pA * (w_cng * open + w_ex * ca_ratio);
}

/// Diagnostic snapshot of the cascade rates for one cell
#[derive(Debug, Clone, Serialize)]
pub struct CascadeDiagnostics {
    pub intensity: f64,
    pub r_star: f64,
    pub e_star: f64,
    pub cgmp_uM: f64,
    pub ca_uM: f64,
    pub synthesis_uM_per_sec: f64,
    pub hydrolysis_per_sec: f64,
    pub channel_open_fraction: f64,
    pub ca_influx_uM_per_sec: f64,
    pub ca_efflux_uM_per_sec: f64,
    pub current_pA: f64,
    /// 1 + J/J_dark
    pub suppression: f64,
}

impl CascadeDiagnostics {
    fn evaluate(cell: &Photoreceptor, intensity: f64) -> Self {
        let c = cell.constants();
        let s = &cell.state;
        let open = c.channel_open_fraction(s.cgmp_uM);

        Self {
            intensity,
            r_star: s.r_star,
            e_star: s.e_star,
            cgmp_uM: s.cgmp_uM,
            ca_uM: s.ca_uM,
            synthesis_uM_per_sec: c.synthesis_rate_uM_per_sec(s.ca_uM),
            hydrolysis_per_sec: c.hydrolysis_rate_per_sec(s.e_star),
            channel_open_fraction: open,
            ca_influx_uM_per_sec: c.gamma_ca_per_sec * (c.c_dark_uM - c.c0_uM) * open,
            ca_efflux_uM_per_sec: c.gamma_ca_per_sec * (s.ca_uM - c.c0_uM),
            current_pA: s.current_pA,
            suppression: s.suppression(c),
        }
    }

    pub fn print_summary(&self, label: &str) {
        println!("=== {} cascade ===", label);
        println!("Intensity:          {:.3} R*/s", self.intensity);
        println!("R*:                 {:.4}", self.r_star);
        println!("E*:                 {:.4}", self.e_star);
        println!("cGMP:               {:.4} uM", self.cgmp_uM);
        println!("Ca2+:               {:.4} uM", self.ca_uM);
        println!("Synthesis:          {:.4} uM/s", self.synthesis_uM_per_sec);
        println!("Hydrolysis:         {:.4} 1/s", self.hydrolysis_per_sec);
        println!("Channel open:       {:.1}%", self.channel_open_fraction * 100.0);
        println!("Ca2+ influx:        {:.4} uM/s", self.ca_influx_uM_per_sec);
        println!("Ca2+ efflux:        {:.4} uM/s", self.ca_efflux_uM_per_sec);
        println!("Current:            {:.3} pA", self.current_pA);
        println!("Suppression:        {:.1}%", self.suppression * 100.0);
    }
}
