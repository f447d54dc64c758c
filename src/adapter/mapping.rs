//! Mapping raw sensor or slider input onto physical light intensity.

use serde::{Deserialize, Serialize};

use crate::config::AdapterConfig;
use crate::error::ConfigError;

/// Ceiling applied to incoming intensities (events/s), far above cone saturation
pub const MAX_INTENSITY: f64 = 1e12;

/// Bring an arbitrary input into the integrator's domain of finite, non-negative intensities.
///
/// NaN and negative inputs become darkness; values above `MAX_INTENSITY`
/// (including +∞) are capped.
#[inline]
pub fn sanitize_intensity(intensity: f64) -> f64 {
    if intensity.is_nan() || intensity <= 0.0 {
        0.0
    } else {
        intensity.min(MAX_INTENSITY)
    }
}

/// Log-scale map from a normalised input in [0, 1] to intensity:
/// `I = 10^(a + b·x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityMapping {
    /// a: log10 of the intensity at x = 0
    pub log10_min: f64,
    /// b: decades covered between x = 0 and x = 1
    pub log10_span: f64,
    /// Full-scale raw reading (10-bit ADC: 1023)
    pub raw_max: u16,
}

impl IntensityMapping {
    pub fn new(config: &AdapterConfig) -> Result<Self, ConfigError> {
        if !config.log10_min_intensity.is_finite() {
            return Err(ConfigError::InvalidMapping(format!(
                "log10 minimum intensity must be finite, got {}",
                config.log10_min_intensity
            )));
        }
        if !(config.log10_intensity_span.is_finite() && config.log10_intensity_span > 0.0) {
            return Err(ConfigError::InvalidMapping(format!(
                "log10 intensity span must be finite and positive, got {}",
                config.log10_intensity_span
            )));
        }
        if config.raw_input_max == 0 {
            return Err(ConfigError::InvalidMapping(
                "raw input full scale must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            log10_min: config.log10_min_intensity,
            log10_span: config.log10_intensity_span,
            raw_max: config.raw_input_max,
        })
    }

    /// Intensity for a normalised input (clamped to [0, 1])
    pub fn intensity(&self, normalized: f64) -> f64 {
        let x = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
        10f64.powf(self.log10_min + self.log10_span * x)
    }

    /// Intensity for a raw sensor reading (e.g. potentiometer on a 10-bit ADC)
    pub fn from_raw(&self, raw: u16) -> f64 {
        let normalized = f64::from(raw.min(self.raw_max)) / f64::from(self.raw_max);
        self.intensity(normalized)
    }

    /// Inverse map, clamped to [0, 1]; non-positive intensities give 0
    pub fn normalized(&self, intensity: f64) -> f64 {
        if !(intensity > 0.0) {
            return 0.0;
        }
        ((intensity.log10() - self.log10_min) / self.log10_span).clamp(0.0, 1.0)
    }

    /// Intensity range covered by the mapping
    pub fn range(&self) -> (f64, f64) {
        (self.intensity(0.0), self.intensity(1.0))
    }
}

impl Default for IntensityMapping {
    fn default() -> Self {
        let config = AdapterConfig::default();
        Self {
            log10_min: config.log10_min_intensity,
            log10_span: config.log10_intensity_span,
            raw_max: config.raw_input_max,
        }
    }
}
