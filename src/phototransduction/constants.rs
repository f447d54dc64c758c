//! Physiological constants for the reduced phototransduction cascade.
//!
//! One immutable instance per cell class. The rod and cone sets are
//! hand-calibrated, not fitted: they are chosen so that the dark state is an
//! exact fixed point of the cascade and so that the steady half-saturation
//! intensity of the rod sits roughly two orders of magnitude below the cone's.
//!
//! Dark-state consistency requires
//! `α_max / (1 + (c_dark/K_c)^m) = β_dark · g_dark`,
//! which both default sets satisfy exactly (20 = 1·4·5 for rods, 20 = 2·2·5 for cones).
//!
//! References (orders of magnitude only):
//! - Pugh EN Jr, Lamb TD. Biochim Biophys Acta. 1993;1141:111-149
//! - Nikonov S, Lamb TD, Pugh EN Jr. J Gen Physiol. 2000;116:795-824

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConstantsError;

/// Lower cGMP clamp (μM)
pub const CGMP_MIN_UM: f64 = 0.01;

/// Upper cGMP clamp (μM)
pub const CGMP_MAX_UM: f64 = 20.0;

/// Upper calcium clamp (μM); the lower clamp is the per-cell floor `c0`
pub const CALCIUM_MAX_UM: f64 = 5.0;

/// Relative tolerance on the dark synthesis/hydrolysis balance
const DARK_BALANCE_TOLERANCE: f64 = 1e-9;

/// Photoreceptor class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellClass {
    /// Scotopic (low-light) receptor
    Rod,
    /// Photopic (bright-light) receptor
    Cone,
}

impl CellClass {
    /// Default constants for this class
    pub fn default_constants(self) -> PhysiologicalConstants {
        match self {
            CellClass::Rod => PhysiologicalConstants::rod(),
            CellClass::Cone => PhysiologicalConstants::cone(),
        }
    }
}

impl fmt::Display for CellClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellClass::Rod => write!(f, "rod"),
            CellClass::Cone => write!(f, "cone"),
        }
    }
}

/// Kinetic and electrical constants of one photoreceptor class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysiologicalConstants {
    /// Lifetime of activated pigment R* (s)
    pub tau_r_sec: f64,

    /// Lifetime of activated enzyme E* (s)
    pub tau_e_sec: f64,

    /// Coupling gain from R* to E* (dimensionless)
    pub gain: f64,

    /// Maximal cGMP synthesis rate (μM/s)
    pub alpha_max_uM_per_sec: f64,

    /// Calcium level at half-maximal synthesis inhibition (μM)
    pub k_c_uM: f64,

    /// Cooperativity of calcium feedback on synthesis (dimensionless)
    pub m_hill: f64,

    /// Dark cGMP hydrolysis rate (1/s)
    pub beta_dark_per_sec: f64,

    /// Light-driven hydrolysis increment per unit E* (1/(s·activity))
    pub beta_sub_per_sec: f64,

    /// Dark-adapted cGMP concentration (μM)
    pub g_dark_uM: f64,

    /// CNG channel cooperativity exponent (dimensionless)
    pub n_cg: f64,

    /// Dark-adapted calcium concentration (μM)
    pub c_dark_uM: f64,

    /// Calcium extrusion floor (μM)
    pub c0_uM: f64,

    /// Calcium turnover rate (1/s)
    pub gamma_ca_per_sec: f64,

    /// Dark current magnitude (pA)
    pub j_dark_pA: f64,

    /// Fraction of the dark current carried by the exchanger pathway
    pub f_ca: f64,
}

impl PhysiologicalConstants {
    /// Rod constants
    ///
    /// Steady half-saturation near 600 R*/s.
    pub fn rod() -> Self {
        Self {
            tau_r_sec: 0.08,
            tau_e_sec: 0.2,
            gain: 2.0,
            alpha_max_uM_per_sec: 20.0,
            k_c_uM: 0.25,
            m_hill: 2.0,
            beta_dark_per_sec: 1.0,
            beta_sub_per_sec: 0.096,
            g_dark_uM: 4.0,
            n_cg: 3.0,
            c_dark_uM: 0.5,
            c0_uM: 0.05,
            gamma_ca_per_sec: 20.0,
            j_dark_pA: 20.0,
            f_ca: 0.1,
        }
    }

    /// Cone constants
    ///
    /// Faster pigment and enzyme shutoff, faster calcium turnover and a
    /// higher dark hydrolysis rate; steady half-saturation near 75,000 R*/s.
    pub fn cone() -> Self {
        Self {
            tau_r_sec: 0.02,
            tau_e_sec: 0.05,
            gain: 1.0,
            alpha_max_uM_per_sec: 20.0,
            k_c_uM: 0.2,
            m_hill: 2.0,
            beta_dark_per_sec: 2.0,
            beta_sub_per_sec: 0.05,
            g_dark_uM: 2.0,
            n_cg: 3.0,
            c_dark_uM: 0.4,
            c0_uM: 0.04,
            gamma_ca_per_sec: 50.0,
            j_dark_pA: 30.0,
            f_ca: 0.2,
        }
    }

    /// Check every constant against its physical domain.
    pub fn validate(&self) -> Result<(), ConstantsError> {
        let positive = [
            ("tau_r_sec", self.tau_r_sec),
            ("tau_e_sec", self.tau_e_sec),
            ("alpha_max_uM_per_sec", self.alpha_max_uM_per_sec),
            ("k_c_uM", self.k_c_uM),
            ("m_hill", self.m_hill),
            ("beta_dark_per_sec", self.beta_dark_per_sec),
            ("g_dark_uM", self.g_dark_uM),
            ("n_cg", self.n_cg),
            ("c_dark_uM", self.c_dark_uM),
            ("c0_uM", self.c0_uM),
            ("gamma_ca_per_sec", self.gamma_ca_per_sec),
            ("j_dark_pA", self.j_dark_pA),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConstantsError::NotPositive { name, value });
            }
        }

        for (name, value) in [("gain", self.gain), ("beta_sub_per_sec", self.beta_sub_per_sec)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConstantsError::Negative { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.f_ca) {
            return Err(ConstantsError::CalciumFractionOutOfRange(self.f_ca));
        }

        if self.c_dark_uM <= self.c0_uM {
            return Err(ConstantsError::CalciumFloorNotBelowDark {
                c_dark_uM: self.c_dark_uM,
                c0_uM: self.c0_uM,
            });
        }

        if !(CGMP_MIN_UM..=CGMP_MAX_UM).contains(&self.g_dark_uM) {
            return Err(ConstantsError::DarkCgmpOutOfRange {
                g_dark_uM: self.g_dark_uM,
                min_uM: CGMP_MIN_UM,
                max_uM: CGMP_MAX_UM,
            });
        }

        if self.c_dark_uM > CALCIUM_MAX_UM {
            return Err(ConstantsError::DarkCalciumAboveCeiling {
                c_dark_uM: self.c_dark_uM,
                max_uM: CALCIUM_MAX_UM,
            });
        }

        let synthesis = self.synthesis_rate_uM_per_sec(self.c_dark_uM);
        let hydrolysis = self.beta_dark_per_sec * self.g_dark_uM;
        if (synthesis - hydrolysis).abs() > DARK_BALANCE_TOLERANCE * hydrolysis {
            return Err(ConstantsError::DarkStateUnbalanced {
                synthesis_uM_per_sec: synthesis,
                hydrolysis_uM_per_sec: hydrolysis,
            });
        }

        Ok(())
    }

    /// Fastest time constant of the cascade, `min(τ_R, τ_E, 1/γ_Ca)` (s).
    ///
    /// Forward Euler is only trustworthy for timesteps well below this.
    pub fn fastest_time_constant_sec(&self) -> f64 {
        self.tau_r_sec
            .min(self.tau_e_sec)
            .min(1.0 / self.gamma_ca_per_sec)
    }

    /// cGMP synthesis rate α(Ca) = α_max / (1 + (Ca/K_c)^m) (μM/s)
    #[inline]
    pub fn synthesis_rate_uM_per_sec(&self, ca_uM: f64) -> f64 {
        self.alpha_max_uM_per_sec / (1.0 + (ca_uM / self.k_c_uM).powf(self.m_hill))
    }

    /// cGMP hydrolysis rate β(E*) = β_dark + β_sub·E* (1/s)
    #[inline]
    pub fn hydrolysis_rate_per_sec(&self, e_star: f64) -> f64 {
        self.beta_dark_per_sec + self.beta_sub_per_sec * e_star
    }

    /// CNG channel-open fraction (g/g_dark)^n_cg.
    ///
    /// Not clamped to 1: cGMP above its dark level opens more channels.
    #[inline]
    pub fn channel_open_fraction(&self, cgmp_uM: f64) -> f64 {
        (cgmp_uM / self.g_dark_uM).powf(self.n_cg)
    }

    /// Normalised calcium (Ca − c0)/(c_dark − c0)
    #[inline]
    pub fn calcium_ratio(&self, ca_uM: f64) -> f64 {
        (ca_uM - self.c0_uM) / (self.c_dark_uM - self.c0_uM)
    }

    /// Split of the dark current between the two pathways
    pub fn current_weights(&self) -> CurrentWeights {
        CurrentWeights::from_calcium_fraction(self.f_ca)
    }
}

/// Pathway weights of the current readout. They sum to 1 and depend only on `f_Ca`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeights {
    /// Cyclic-nucleotide-gated channel weight, 2/(f_Ca + 2)
    pub cng: f64,
    /// Na+/Ca2+,K+ exchanger weight, f_Ca/(f_Ca + 2)
    pub exchanger: f64,
}

impl CurrentWeights {
    pub fn from_calcium_fraction(f_ca: f64) -> Self {
        let denom = f_ca + 2.0;
        Self {
            cng: 2.0 / denom,
            exchanger: f_ca / denom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants_valid() {
        assert!(PhysiologicalConstants::rod().validate().is_ok());
        assert!(PhysiologicalConstants::cone().validate().is_ok());
    }

    #[test]
    fn test_dark_state_is_fixed_point() {
        for constants in [PhysiologicalConstants::rod(), PhysiologicalConstants::cone()] {
            let synthesis = constants.synthesis_rate_uM_per_sec(constants.c_dark_uM);
            let hydrolysis = constants.hydrolysis_rate_per_sec(0.0) * constants.g_dark_uM;
            assert!(
                (synthesis - hydrolysis).abs() < 1e-12,
                "dark synthesis {} should balance dark hydrolysis {}",
                synthesis,
                hydrolysis
            );
        }
    }

    #[test]
    fn test_rejects_unbalanced_dark_state() {
        let mut constants = PhysiologicalConstants::rod();
        constants.alpha_max_uM_per_sec = 30.0;
        match constants.validate() {
            Err(ConstantsError::DarkStateUnbalanced {
                synthesis_uM_per_sec,
                hydrolysis_uM_per_sec,
            }) => {
                assert!((synthesis_uM_per_sec - 6.0).abs() < 1e-12);
                assert!((hydrolysis_uM_per_sec - 4.0).abs() < 1e-12);
            }
            other => panic!("expected DarkStateUnbalanced, got {:?}", other),
        }

        // Rebalancing through β_dark restores a valid set
        constants.beta_dark_per_sec = 1.5;
        assert!(constants.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_time_constant() {
        let mut constants = PhysiologicalConstants::rod();
        constants.tau_e_sec = 0.0;
        assert_eq!(
            constants.validate(),
            Err(ConstantsError::NotPositive {
                name: "tau_e_sec",
                value: 0.0
            })
        );

        constants.tau_e_sec = f64::NAN;
        assert!(matches!(
            constants.validate(),
            Err(ConstantsError::NotPositive { name: "tau_e_sec", .. })
        ));
    }

    #[test]
    fn test_rejects_calcium_fraction_out_of_range() {
        let mut constants = PhysiologicalConstants::cone();
        constants.f_ca = 1.2;
        assert_eq!(
            constants.validate(),
            Err(ConstantsError::CalciumFractionOutOfRange(1.2))
        );
    }

    #[test]
    fn test_rejects_floor_above_dark_calcium() {
        let mut constants = PhysiologicalConstants::rod();
        constants.c0_uM = constants.c_dark_uM;
        assert!(matches!(
            constants.validate(),
            Err(ConstantsError::CalciumFloorNotBelowDark { .. })
        ));
    }

    #[test]
    fn test_rejects_dark_cgmp_outside_clamp() {
        let mut constants = PhysiologicalConstants::rod();
        constants.g_dark_uM = 25.0;
        assert!(matches!(
            constants.validate(),
            Err(ConstantsError::DarkCgmpOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_gain_allowed() {
        let mut constants = PhysiologicalConstants::rod();
        constants.gain = 0.0;
        assert!(constants.validate().is_ok());
        constants.gain = -1.0;
        assert!(matches!(
            constants.validate(),
            Err(ConstantsError::Negative { name: "gain", .. })
        ));
    }

    #[test]
    fn test_current_weights_sum_to_one() {
        for f_ca in [0.0, 0.1, 0.2, 0.5, 1.0] {
            let w = CurrentWeights::from_calcium_fraction(f_ca);
            assert!((w.cng + w.exchanger - 1.0).abs() < 1e-15);
        }
        let w = CurrentWeights::from_calcium_fraction(0.0);
        assert_eq!(w.exchanger, 0.0);
        assert_eq!(w.cng, 1.0);
    }

    #[test]
    fn test_fastest_time_constant() {
        // Rod: min(0.08, 0.2, 1/20) = 0.05
        let rod = PhysiologicalConstants::rod();
        assert!((rod.fastest_time_constant_sec() - 0.05).abs() < 1e-12);
        // Cone: min(0.02, 0.05, 1/50) = 0.02
        let cone = PhysiologicalConstants::cone();
        assert!((cone.fastest_time_constant_sec() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_channel_open_fraction_can_exceed_one() {
        let rod = PhysiologicalConstants::rod();
        assert!((rod.channel_open_fraction(rod.g_dark_uM) - 1.0).abs() < 1e-15);
        assert!(rod.channel_open_fraction(rod.g_dark_uM * 1.1) > 1.0);
    }

    #[test]
    fn test_serialization() {
        let constants = PhysiologicalConstants::cone();
        let json = serde_json::to_string_pretty(&constants).unwrap();
        let parsed: PhysiologicalConstants = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, constants);
    }

    #[test]
    fn test_cell_class_display() {
        assert_eq!(CellClass::Rod.to_string(), "rod");
        assert_eq!(CellClass::Cone.to_string(), "cone");
        assert_eq!(serde_json::to_string(&CellClass::Cone).unwrap(), "\"cone\"");
    }
}
