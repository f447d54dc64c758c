//! Photoreceptor Sim - Entry point
//!
//! Rod and cone phototransduction driven by a light-intensity input.
//!
//! CLI Usage:
//!   cargo run                          # Real-time loop, slider sweep, serial lines on stdout
//!   cargo run -- -i 600 --duration 10  # Constant intensity for 10 wall seconds
//!   cargo run -- --diagnose -i 600 -t 5  # Headless diagnostics (no pacing)

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use photoreceptor_sim::{
    adapter::{ConstantIntensity, IntensityMapping, IntensitySource, SerialLogger, SliderSweep, Tee},
    config::Parameters,
    driver::{RealTimeLoop, RunLimit, SimulationDriver},
    export::{export_state_json, CsvExporter},
    phototransduction::{half_saturation_intensity, simulated_half_saturation, SteadyState},
};

/// Parsed command-line options
struct CliOptions {
    diagnose: bool,
    intensity: Option<f64>,
    sim_time_sec: f64,
    duration_sec: Option<f64>,
    sweep_period_sec: f64,
    csv: bool,
    json: bool,
    params_dir: Option<PathBuf>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            diagnose: false,
            intensity: None,
            sim_time_sec: 5.0,
            duration_sec: None,
            sweep_period_sec: 10.0,
            csv: false,
            json: false,
            params_dir: None,
        }
    }
}

/// Run both cells headless at a constant intensity and report
fn run_diagnostics(params: &Parameters, options: &CliOptions) -> Result<()> {
    println!("=== Photoreceptor Sim - Cascade Diagnostics ===\n");

    let intensity = options.intensity.unwrap_or(600.0);
    let mut driver = SimulationDriver::from_parameters(params)?;

    println!(
        "Timestep: {} ms, {} sub-steps per {} ms tick",
        params.simulation.dt_sec * 1000.0,
        params.simulation.substeps_per_tick,
        params.simulation.tick_interval_sec * 1000.0
    );
    println!("Intensity: {:.3} R*/s for {:.2} s simulated\n", intensity, options.sim_time_sec);

    let start_time = Instant::now();
    let metrics = driver.advance(intensity, options.sim_time_sec);
    let elapsed = start_time.elapsed();

    let integrator = driver.integrator();
    integrator.diagnostics(driver.rod(), intensity).print_summary("Rod");
    println!();
    integrator.diagnostics(driver.cone(), intensity).print_summary("Cone");
    println!();
    metrics.print_summary();

    println!("\n=== Steady State Prediction ===");
    for (label, cell) in [("Rod", driver.rod()), ("Cone", driver.cone())] {
        let ss = SteadyState::at_intensity(cell.constants(), intensity);
        let deviation = (cell.current_pA() - ss.current_pA).abs();
        println!(
            "{:<5} predicted {:.3} pA, simulated {:.3} pA (|Δ| = {:.2e} pA)",
            label,
            ss.current_pA,
            cell.current_pA(),
            deviation
        );
    }

    println!("\n=== Half-Saturation Intensity ===");
    for (label, cell) in [("Rod", driver.rod()), ("Cone", driver.cone())] {
        let closed_form = half_saturation_intensity(cell.constants());
        let simulated = simulated_half_saturation(cell, integrator, 10.0, 30);
        println!(
            "{:<5} closed form {:.1} R*/s, simulated {:.1} R*/s",
            label, closed_form, simulated
        );
    }

    println!("\n=== Performance ===");
    println!("Elapsed time: {:.2?}", elapsed);
    println!(
        "Steps per second: {:.0}",
        (2 * metrics.total_steps) as f64 / elapsed.as_secs_f64().max(1e-9)
    );

    if options.json {
        let path = export_state_json(&metrics)?;
        println!("\nState exported to {}", path.display());
    }

    Ok(())
}

/// Pace the simulation in real time and stream serial lines to stdout
fn run_realtime(params: &Parameters, options: &CliOptions) -> Result<()> {
    let mapping = IntensityMapping::new(&params.adapter)?;
    let driver = SimulationDriver::from_parameters(params)?;
    let mut rt = RealTimeLoop::new(driver);

    let mut source: Box<dyn IntensitySource> = match options.intensity {
        Some(intensity) => {
            log::info!("Constant intensity {:.3} R*/s", intensity);
            Box::new(ConstantIntensity(intensity))
        }
        None => {
            let (lo, hi) = mapping.range();
            log::info!(
                "Slider sweep {:.1}..{:.1} R*/s, period {:.1} s",
                lo,
                hi,
                options.sweep_period_sec
            );
            Box::new(SliderSweep::new(mapping, options.sweep_period_sec))
        }
    };

    let limit = match options.duration_sec {
        Some(secs) => RunLimit::wall_clock_secs(secs),
        None => RunLimit::Forever,
    };

    let serial = SerialLogger::new(io::stdout().lock());
    if options.csv {
        let exporter = CsvExporter::new(params.simulation.tick_interval_sec)?;
        let mut sink = Tee::new(serial, exporter);
        rt.run(source.as_mut(), &mut sink, limit)?;
        sink.second.finish()?;
    } else {
        let mut sink = serial;
        rt.run(source.as_mut(), &mut sink, limit)?;
    }

    Ok(())
}

fn print_help() {
    println!("Photoreceptor Sim");
    println!();
    println!("Usage: photoreceptor-sim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --diagnose, -d       Run headless cascade diagnostics");
    println!("  -i, --intensity I    Constant intensity in R*/s (default: slider sweep; 600 for --diagnose)");
    println!("  -t, --time S         Simulated seconds for --diagnose (default: 5)");
    println!("  --duration S         Stop the real-time loop after S wall seconds (default: run forever)");
    println!("  --period S           Slider sweep period in seconds (default: 10)");
    println!("  --csv                Also record a CSV time series in exports/");
    println!("  --json               Export the final state as JSON (with --diagnose)");
    println!("  --params DIR         Load parameter files from DIR (default: data/parameters)");
    println!("  --help, -h           Show this help");
}

/// Parse CLI arguments
fn parse_args() -> CliOptions {
    let args: Vec<String> = std::env::args().collect();
    let mut options = CliOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--diagnose" | "-d" => options.diagnose = true,
            "-i" | "--intensity" => {
                i += 1;
                if i < args.len() {
                    options.intensity = args[i].parse().ok();
                }
            }
            "-t" | "--time" => {
                i += 1;
                if i < args.len() {
                    options.sim_time_sec = args[i].parse().unwrap_or(5.0);
                }
            }
            "--duration" => {
                i += 1;
                if i < args.len() {
                    options.duration_sec = args[i].parse().ok();
                }
            }
            "--period" => {
                i += 1;
                if i < args.len() {
                    options.sweep_period_sec = args[i].parse().unwrap_or(10.0);
                }
            }
            "--csv" => options.csv = true,
            "--json" => options.json = true,
            "--params" => {
                i += 1;
                if i < args.len() {
                    options.params_dir = Some(PathBuf::from(&args[i]));
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => log::warn!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    options
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args();

    let params = match &options.params_dir {
        Some(dir) => Parameters::load_from_dir(dir),
        None => Parameters::load_or_default(),
    };
    params.validate()?;

    if options.diagnose {
        return run_diagnostics(&params, &options);
    }

    log::info!("Photoreceptor Sim starting...");
    run_realtime(&params, &options)
}
