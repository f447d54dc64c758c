//! Mapping cell currents onto display signals.

use serde::{Deserialize, Serialize};

/// Normalised response in [0, 1]: 0 in darkness (J = −J_dark), 1 when saturated (J = 0).
#[inline]
pub fn normalized_response(current_pA: f64, j_dark_pA: f64) -> f64 {
    (1.0 + current_pA / j_dark_pA).clamp(0.0, 1.0)
}

/// Cone (photopic) weight for the combined display, `clamp((log10 I + 1)/4, 0, 1)`.
///
/// Zero at 0.1 events/s and below, one from 1000 events/s upward.
pub fn photopic_weight(intensity: f64) -> f64 {
    if !(intensity > 0.0) {
        return 0.0;
    }
    ((intensity.log10() + 1.0) / 4.0).clamp(0.0, 1.0)
}

/// LED duty cycle for a normalised signal
#[inline]
pub fn pwm_duty(normalized: f64) -> u8 {
    let x = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
    (x * 255.0).round() as u8
}

/// Dominant vision regime for an intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VisionRegime {
    /// Rod-dominated
    #[default]
    Scotopic,
    /// Both classes contribute
    Mesopic,
    /// Cone-dominated
    Photopic,
}

impl VisionRegime {
    pub fn from_cone_weight(cone_weight: f64) -> Self {
        if cone_weight < 0.1 {
            VisionRegime::Scotopic
        } else if cone_weight > 0.9 {
            VisionRegime::Photopic
        } else {
            VisionRegime::Mesopic
        }
    }
}

/// Rod/cone responses blended by intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedResponse {
    pub rod_weight: f64,
    pub cone_weight: f64,
    pub combined: f64,
    pub regime: VisionRegime,
}

/// Weight the normalised rod and cone responses by the photopic weight of `intensity`
pub fn blend(rod_normalized: f64, cone_normalized: f64, intensity: f64) -> BlendedResponse {
    let cone_weight = photopic_weight(intensity);
    let rod_weight = 1.0 - cone_weight;

    BlendedResponse {
        rod_weight,
        cone_weight,
        combined: rod_weight * rod_normalized + cone_weight * cone_normalized,
        regime: VisionRegime::from_cone_weight(cone_weight),
    }
}
