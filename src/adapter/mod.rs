//! I/O adapter between the outside world and the cascade.
//!
//! Inbound, raw sensor or slider readings become physical intensities
//! (events/s) on a log scale. Outbound, cell currents become normalised
//! display values, an intensity-weighted rod/cone blend, an LED duty cycle
//! and serial log lines. None of this feeds back into the cascade.

mod display;
mod mapping;
mod serial;
mod sources;

pub use display::{
    blend, normalized_response, photopic_weight, pwm_duty, BlendedResponse, VisionRegime,
};
pub use mapping::{sanitize_intensity, IntensityMapping, MAX_INTENSITY};
pub use serial::{format_line, SerialLogger, SERIAL_HEADER};
pub use sources::{ConstantIntensity, RawSensorSource, SliderSweep};

use anyhow::Result;

use crate::state::SimulationMetrics;

/// Supplies the light intensity, sampled once per outer tick
pub trait IntensitySource {
    /// Intensity (events/s) at `elapsed_sec` since the run started
    fn sample(&mut self, elapsed_sec: f64) -> f64;
}

impl<F> IntensitySource for F
where
    F: FnMut(f64) -> f64,
{
    fn sample(&mut self, elapsed_sec: f64) -> f64 {
        self(elapsed_sec)
    }
}

/// Consumes the per-tick output
pub trait ResponseSink {
    fn consume(&mut self, metrics: &SimulationMetrics) -> Result<()>;
}

impl ResponseSink for Vec<SimulationMetrics> {
    fn consume(&mut self, metrics: &SimulationMetrics) -> Result<()> {
        self.push(metrics.clone());
        Ok(())
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn consume(&mut self, metrics: &SimulationMetrics) -> Result<()> {
        (**self).consume(metrics)
    }
}

/// Forwards every snapshot to two sinks
pub struct Tee<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: ResponseSink, B: ResponseSink> ResponseSink for Tee<A, B> {
    fn consume(&mut self, metrics: &SimulationMetrics) -> Result<()> {
        self.first.consume(metrics)?;
        self.second.consume(metrics)
    }
}
