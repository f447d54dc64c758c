//! Line-oriented serial log of per-tick output.
//!
//! Format: one header line, then one comma-separated line per tick:
//! `time_ms,intensity,rod_pA,cone_pA,rod_norm,cone_norm,combined,pwm`

use std::io::Write;

use anyhow::Result;

use super::ResponseSink;
use crate::state::SimulationMetrics;

pub const SERIAL_HEADER: &str = "time_ms,intensity,rod_pA,cone_pA,rod_norm,cone_norm,combined,pwm";

/// Format one metrics snapshot as a serial log line (no trailing newline)
pub fn format_line(m: &SimulationMetrics) -> String {
    format!(
        "{:.0},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{}",
        m.simulation_time_sec * 1000.0,
        m.intensity,
        m.rod.current_pA,
        m.cone.current_pA,
        m.rod.normalized_response,
        m.cone.normalized_response,
        m.combined_response,
        m.pwm_duty
    )
}

/// Writes serial log lines to any `Write` (stdout, a serial port, a file)
pub struct SerialLogger<W: Write> {
    writer: W,
    header_written: bool,
    lines_written: u64,
}

impl<W: Write> SerialLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            lines_written: 0,
        }
    }

    /// Data lines written so far (excluding the header)
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Flush and hand back the writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ResponseSink for SerialLogger<W> {
    fn consume(&mut self, metrics: &SimulationMetrics) -> Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{}", SERIAL_HEADER)?;
            self.header_written = true;
        }
        writeln!(self.writer, "{}", format_line(metrics))?;
        self.lines_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Photoreceptor;

    fn dark_metrics(time_sec: f64) -> SimulationMetrics {
        let rod = Photoreceptor::rod().unwrap();
        let cone = Photoreceptor::cone().unwrap();
        SimulationMetrics::capture(&rod, &cone, 0.0, time_sec, 1, 20)
    }

    #[test]
    fn test_format_line() {
        let line = format_line(&dark_metrics(0.02));
        assert_eq!(line, "20,0.0000,-20.0000,-30.0000,0.0000,0.0000,0.0000,0");
    }

    #[test]
    fn test_header_written_once() {
        let mut logger = SerialLogger::new(Vec::new());
        logger.consume(&dark_metrics(0.02)).unwrap();
        logger.consume(&dark_metrics(0.04)).unwrap();
        assert_eq!(logger.lines_written(), 2);

        let output = String::from_utf8(logger.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SERIAL_HEADER);
        assert!(lines[2].starts_with("40,"));
    }
}
