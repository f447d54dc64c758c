//! Intensity sources sampled once per outer tick.

use super::mapping::IntensityMapping;
use super::IntensitySource;

/// Fixed intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantIntensity(pub f64);

impl IntensitySource for ConstantIntensity {
    fn sample(&mut self, _elapsed_sec: f64) -> f64 {
        self.0
    }
}

/// A slider swept up and down: the normalised input follows a triangle wave
/// (0 → 1 → 0 over one period), mapped through the log-scale intensity map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSweep {
    pub mapping: IntensityMapping,
    pub period_sec: f64,
}

impl SliderSweep {
    pub fn new(mapping: IntensityMapping, period_sec: f64) -> Self {
        Self { mapping, period_sec }
    }

    /// Slider position at `elapsed_sec`, in [0, 1]
    pub fn position(&self, elapsed_sec: f64) -> f64 {
        if !(self.period_sec > 0.0) {
            return 0.0;
        }
        let phase = (elapsed_sec / self.period_sec).rem_euclid(1.0);
        1.0 - (2.0 * phase - 1.0).abs()
    }
}

impl IntensitySource for SliderSweep {
    fn sample(&mut self, elapsed_sec: f64) -> f64 {
        self.mapping.intensity(self.position(elapsed_sec))
    }
}

/// Raw sensor reading (e.g. a potentiometer on an ADC) mapped to intensity
pub struct RawSensorSource<F>
where
    F: FnMut() -> u16,
{
    read: F,
    mapping: IntensityMapping,
    last_raw: u16,
}

impl<F> RawSensorSource<F>
where
    F: FnMut() -> u16,
{
    pub fn new(mapping: IntensityMapping, read: F) -> Self {
        Self {
            read,
            mapping,
            last_raw: 0,
        }
    }

    /// Most recent raw reading
    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }
}

impl<F> IntensitySource for RawSensorSource<F>
where
    F: FnMut() -> u16,
{
    fn sample(&mut self, _elapsed_sec: f64) -> f64 {
        self.last_raw = (self.read)();
        self.mapping.from_raw(self.last_raw)
    }
}
