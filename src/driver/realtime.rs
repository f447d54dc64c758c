//! Wall-clock pacing of the simulation driver.
//!
//! The loop polls a monotonic clock and does work only once a full tick
//! interval has passed since the previous tick; between ticks it spins.
//! There are no suspension points, and nothing is cancelled: the loop ends
//! only when its `RunLimit` is reached, or never for `RunLimit::Forever`.

use std::time::{Duration, Instant};

use anyhow::Result;

use super::simulation::SimulationDriver;
use crate::adapter::{IntensitySource, ResponseSink};

/// When the loop stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLimit {
    /// Run until the process is terminated
    Forever,
    /// Stop after this many ticks
    Ticks(u64),
    /// Stop once this much wall-clock time has passed
    WallClock(Duration),
}

impl RunLimit {
    /// Wall-clock limit from seconds.
    ///
    /// Negative and NaN values stop immediately; values too large for a
    /// `Duration` (including +∞) run forever.
    pub fn wall_clock_secs(secs: f64) -> Self {
        let secs = if secs.is_nan() { 0.0 } else { secs.max(0.0) };
        match Duration::try_from_secs_f64(secs) {
            Ok(duration) => RunLimit::WallClock(duration),
            Err(_) => {
                log::warn!("Run duration {} s is out of range, running until terminated", secs);
                RunLimit::Forever
            }
        }
    }
}

/// Outcome of a finite run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub wall_elapsed: Duration,
    pub simulated_sec: f64,
    /// Ticks that started at least one full interval late
    pub overruns: u64,
}

/// Busy-polling real-time loop around a `SimulationDriver`
pub struct RealTimeLoop {
    driver: SimulationDriver,
    tick_interval: Duration,
}

impl RealTimeLoop {
    pub fn new(driver: SimulationDriver) -> Self {
        let tick_interval = Duration::from_secs_f64(driver.config().tick_interval_sec);
        Self {
            driver,
            tick_interval,
        }
    }

    pub fn driver(&self) -> &SimulationDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut SimulationDriver {
        &mut self.driver
    }

    pub fn into_driver(self) -> SimulationDriver {
        self.driver
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Pace the driver against the wall clock.
    ///
    /// The source is sampled once per tick with the simulated time at the
    /// start of that tick; the sink receives the metrics after every tick.
    /// A sink error stops the loop and is returned.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K, limit: RunLimit) -> Result<RunSummary>
    where
        S: IntensitySource + ?Sized,
        K: ResponseSink + ?Sized,
    {
        log::info!(
            "Real-time loop started: tick {:?}, {} sub-steps, limit {:?}",
            self.tick_interval,
            self.driver.config().substeps_per_tick,
            limit
        );

        let start = Instant::now();
        let mut last_tick = start;
        let mut ticks = 0u64;
        let mut overruns = 0u64;

        loop {
            if let RunLimit::Ticks(max) = limit {
                if ticks >= max {
                    break;
                }
            }

            let now = Instant::now();
            if let RunLimit::WallClock(max) = limit {
                if now.duration_since(start) >= max {
                    break;
                }
            }

            let since_last = now.duration_since(last_tick);
            if since_last < self.tick_interval {
                std::hint::spin_loop();
                continue;
            }
            if since_last >= self.tick_interval * 2 {
                overruns += 1;
            }
            last_tick = now;

            let intensity = source.sample(self.driver.simulation_time_sec());
            let metrics = self.driver.tick(intensity);
            sink.consume(&metrics)?;
            ticks += 1;

            if ticks % 500 == 0 {
                log::debug!(
                    "t = {:.1} s: I = {:.2}, rod {:.2} pA, cone {:.2} pA",
                    metrics.simulation_time_sec,
                    metrics.intensity,
                    metrics.rod.current_pA,
                    metrics.cone.current_pA
                );
            }
        }

        let summary = RunSummary {
            ticks,
            wall_elapsed: start.elapsed(),
            simulated_sec: self.driver.simulation_time_sec(),
            overruns,
        };
        log::info!(
            "Real-time loop stopped after {} ticks ({:.3} s wall, {:.3} s simulated, {} overruns)",
            summary.ticks,
            summary.wall_elapsed.as_secs_f64(),
            summary.simulated_sec,
            summary.overruns
        );
        Ok(summary)
    }
}
