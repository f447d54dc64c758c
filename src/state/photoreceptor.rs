//! Photoreceptor state data structures.
//!
//! A `Photoreceptor` owns its mutable cascade state exclusively; its constants
//! are immutable and shared behind an `Arc`, so several cells of one class can
//! reuse a single constant set.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::phototransduction::{CellClass, CurrentWeights, PhysiologicalConstants};

/// Mutable cascade state of one photoreceptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoreceptorState {
    /// Activated pigment signal R* (activity units, ≥ 0)
    pub r_star: f64,
    /// Activated enzyme signal E* (activity units, ≥ 0)
    pub e_star: f64,
    /// cGMP concentration (μM), clamped to [0.01, 20]
    pub cgmp_uM: f64,
    /// Intracellular calcium (μM), clamped to [c0, 5]
    pub ca_uM: f64,
    /// Membrane current (pA); derived from cGMP and calcium, never integrated
    pub current_pA: f64,
}

impl PhotoreceptorState {
    /// Dark-adapted steady state: no activation, dark cGMP and calcium, full dark current
    pub fn dark_adapted(constants: &PhysiologicalConstants) -> Self {
        Self {
            r_star: 0.0,
            e_star: 0.0,
            cgmp_uM: constants.g_dark_uM,
            ca_uM: constants.c_dark_uM,
            current_pA: -constants.j_dark_pA,
        }
    }

    /// Fraction of the dark current suppressed by light, 1 + J/J_dark (unclamped)
    pub fn suppression(&self, constants: &PhysiologicalConstants) -> f64 {
        1.0 + self.current_pA / constants.j_dark_pA
    }
}

/// One rod or cone: state, shared constants and precomputed readout weights
#[derive(Debug, Clone)]
pub struct Photoreceptor {
    class: CellClass,
    constants: Arc<PhysiologicalConstants>,
    weights: CurrentWeights,
    /// Cascade state, advanced in place by the integrator
    pub state: PhotoreceptorState,
}

impl Photoreceptor {
    /// Validate the constants and seed the cell at its dark-adapted state.
    pub fn new(class: CellClass, constants: Arc<PhysiologicalConstants>) -> Result<Self, ConfigError> {
        constants
            .validate()
            .map_err(|source| ConfigError::constants(class, source))?;

        let weights = constants.current_weights();
        let state = PhotoreceptorState::dark_adapted(&constants);

        Ok(Self {
            class,
            constants,
            weights,
            state,
        })
    }

    /// Rod with default constants
    pub fn rod() -> Result<Self, ConfigError> {
        Self::new(CellClass::Rod, Arc::new(PhysiologicalConstants::rod()))
    }

    /// Cone with default constants
    pub fn cone() -> Result<Self, ConfigError> {
        Self::new(CellClass::Cone, Arc::new(PhysiologicalConstants::cone()))
    }

    pub fn class(&self) -> CellClass {
        self.class
    }

    pub fn constants(&self) -> &PhysiologicalConstants {
        &self.constants
    }

    /// Shared handle to the constants, for constructing sibling cells
    pub fn shared_constants(&self) -> Arc<PhysiologicalConstants> {
        Arc::clone(&self.constants)
    }

    pub fn weights(&self) -> CurrentWeights {
        self.weights
    }

    /// Current membrane current (pA)
    pub fn current_pA(&self) -> f64 {
        self.state.current_pA
    }

    /// Constants and state borrowed together for one integration sweep
    pub(crate) fn split_mut(&mut self) -> (&PhysiologicalConstants, &mut PhotoreceptorState) {
        (&*self.constants, &mut self.state)
    }

    /// Return to the dark-adapted state
    pub fn reset(&mut self) {
        self.state = PhotoreceptorState::dark_adapted(&self.constants);
    }
}
