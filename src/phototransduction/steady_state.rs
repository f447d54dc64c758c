//! Steady-state analysis of the cascade under constant light.
//!
//! The forward-Euler fixed point coincides with the ODE fixed point, so the
//! settled state for a constant intensity follows from algebra alone:
//!
//! - R* = I·τ_R, E* = gain·τ_R·τ_E·I
//! - the calcium balance forces (Ca − c0)/(c_dark − c0) = (g/g_dark)^n_cg = x,
//!   so both current pathways carry the same fraction and J = −J_dark·x
//! - x solves α(c0 + (c_dark − c0)·x) = β(E*)·g_dark·x^(1/n_cg)
//!
//! The left side falls and the right side rises with x, so the root in (0, 1]
//! is unique and bisection finds it. The cGMP clamp is ignored; at intensities
//! where g would settle below 0.01 μM the simulated state differs.

use serde::Serialize;

use super::constants::PhysiologicalConstants;
use super::integrator::CascadeIntegrator;
use crate::state::Photoreceptor;

const BISECTION_ITERATIONS: usize = 100;

/// Settled cascade state for one constant intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteadyState {
    pub intensity: f64,
    pub r_star: f64,
    pub e_star: f64,
    pub cgmp_uM: f64,
    pub ca_uM: f64,
    pub channel_open_fraction: f64,
    pub current_pA: f64,
    /// 1 + J/J_dark
    pub suppression: f64,
}

impl SteadyState {
    /// Steady state reached under constant `intensity` (≥ 0)
    pub fn at_intensity(c: &PhysiologicalConstants, intensity: f64) -> Self {
        let r_star = intensity * c.tau_r_sec;
        let e_star = c.gain * c.tau_e_sec * r_star;
        let beta = c.hydrolysis_rate_per_sec(e_star);

        let imbalance = |x: f64| {
            let ca = c.c0_uM + (c.c_dark_uM - c.c0_uM) * x;
            let g = c.g_dark_uM * x.powf(1.0 / c.n_cg);
            c.synthesis_rate_uM_per_sec(ca) - beta * g
        };

        let x = if imbalance(1.0) >= 0.0 {
            1.0
        } else {
            let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
            for _ in 0..BISECTION_ITERATIONS {
                let mid = 0.5 * (lo + hi);
                if imbalance(mid) > 0.0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            0.5 * (lo + hi)
        };

        let current_pA = -c.j_dark_pA * x;
        Self {
            intensity,
            r_star,
            e_star,
            cgmp_uM: c.g_dark_uM * x.powf(1.0 / c.n_cg),
            ca_uM: c.c0_uM + (c.c_dark_uM - c.c0_uM) * x,
            channel_open_fraction: x,
            current_pA,
            suppression: 1.0 - x,
        }
    }
}

/// Constant intensity that suppresses half of the dark current, in closed form.
///
/// `I½ = (α(Ca½)/g½ − β_dark) / (β_sub·gain·τ_R·τ_E)` with the open fraction
/// at 0.5. Infinite when light cannot drive hydrolysis (zero gain or β_sub).
pub fn half_saturation_intensity(c: &PhysiologicalConstants) -> f64 {
    let x = 0.5_f64;
    let ca = c.c0_uM + (c.c_dark_uM - c.c0_uM) * x;
    let g = c.g_dark_uM * x.powf(1.0 / c.n_cg);
    let required_beta = c.synthesis_rate_uM_per_sec(ca) / g;

    let sensitivity = c.beta_sub_per_sec * c.gain * c.tau_r_sec * c.tau_e_sec;
    if sensitivity <= 0.0 {
        return f64::INFINITY;
    }
    ((required_beta - c.beta_dark_per_sec) / sensitivity).max(0.0)
}

/// Half-saturation intensity found by integrating the cascade.
///
/// Bisects in log10 intensity over [1e-2, 1e9]; each probe starts from the dark
/// state and integrates for `settle_sec` before reading the current.
pub fn simulated_half_saturation(
    template: &Photoreceptor,
    integrator: &CascadeIntegrator,
    settle_sec: f64,
    iterations: usize,
) -> f64 {
    let mut cell = template.clone();
    let (mut lo, mut hi) = (-2.0_f64, 9.0_f64);

    for _ in 0..iterations {
        let mid = 0.5 * (lo + hi);
        cell.reset();
        integrator.run(&mut cell, 10f64.powf(mid), settle_sec);

        if cell.state.suppression(cell.constants()) < 0.5 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    10f64.powf(0.5 * (lo + hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_steady_state() {
        let rod = PhysiologicalConstants::rod();
        let ss = SteadyState::at_intensity(&rod, 0.0);
        assert_eq!(ss.channel_open_fraction, 1.0);
        assert_eq!(ss.cgmp_uM, rod.g_dark_uM);
        assert!((ss.ca_uM - rod.c_dark_uM).abs() < 1e-15);
        assert_eq!(ss.current_pA, -rod.j_dark_pA);
    }

    #[test]
    fn test_steady_state_balances_rates() {
        let cone = PhysiologicalConstants::cone();
        let ss = SteadyState::at_intensity(&cone, 20_000.0);
        let synthesis = cone.synthesis_rate_uM_per_sec(ss.ca_uM);
        let hydrolysis = cone.hydrolysis_rate_per_sec(ss.e_star) * ss.cgmp_uM;
        assert!((synthesis - hydrolysis).abs() < 1e-9);
        assert!(ss.suppression > 0.0 && ss.suppression < 1.0);
    }

    #[test]
    fn test_steady_suppression_monotonic() {
        let rod = PhysiologicalConstants::rod();
        let mut last = -1.0;
        for intensity in [0.0, 1.0, 10.0, 100.0, 1e3, 1e4, 1e5] {
            let s = SteadyState::at_intensity(&rod, intensity).suppression;
            assert!(s > last, "suppression should grow with intensity");
            last = s;
        }
    }

    #[test]
    fn test_half_saturation_matches_steady_state() {
        for c in [PhysiologicalConstants::rod(), PhysiologicalConstants::cone()] {
            let i_half = half_saturation_intensity(&c);
            let ss = SteadyState::at_intensity(&c, i_half);
            assert!(
                (ss.suppression - 0.5).abs() < 1e-9,
                "closed-form I½ = {} gives suppression {}",
                i_half,
                ss.suppression
            );
        }
    }

    #[test]
    fn test_half_saturation_values() {
        let rod = half_saturation_intensity(&PhysiologicalConstants::rod());
        let cone = half_saturation_intensity(&PhysiologicalConstants::cone());
        assert!(rod > 500.0 && rod < 1000.0, "rod I½ = {}", rod);
        assert!(cone > 50_000.0 && cone < 100_000.0, "cone I½ = {}", cone);
    }

    #[test]
    fn test_half_saturation_infinite_without_gain() {
        let mut rod = PhysiologicalConstants::rod();
        rod.gain = 0.0;
        assert!(half_saturation_intensity(&rod).is_infinite());
    }
}
