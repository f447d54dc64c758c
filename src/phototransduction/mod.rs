//! Phototransduction cascade for rods and cones.
//!
//! A reduced five-variable kinetic model of the vertebrate photoresponse:
//! - R*: photoactivated pigment, driven by light, decays with τ_R
//! - E*: activated enzyme (PDE), driven by R*, decays with τ_E
//! - cGMP: synthesised under calcium feedback, hydrolysed by E*
//! - Ca2+: enters through cGMP-gated channels, extruded toward a floor c0
//! - J: membrane current read out from channel opening and calcium
//!
//! Light lowers cGMP, closing channels and suppressing the inward dark
//! current; the fall in calcium speeds cGMP synthesis and opposes the
//! suppression (adaptation).
//!
//! References:
//! - Pugh EN Jr, Lamb TD. Biochim Biophys Acta. 1993;1141:111-149
//! - Nikonov S, Lamb TD, Pugh EN Jr. J Gen Physiol. 2000;116:795-824

pub mod constants;
pub mod integrator;
pub mod steady_state;

pub use constants::{
    CellClass, CurrentWeights, PhysiologicalConstants, CALCIUM_MAX_UM, CGMP_MAX_UM, CGMP_MIN_UM,
};
pub use integrator::{
    check_timestep, CascadeDiagnostics, CascadeIntegrator, IntegratorConfig, DEFAULT_DT_SEC,
    MAX_DT_FRACTION_OF_FASTEST,
};
pub use steady_state::{half_saturation_intensity, simulated_half_saturation, SteadyState};
