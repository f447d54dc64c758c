//! Integration tests for parameter files and data export
//!
//! Tests validate:
//! - Parameter directories with partial, malformed or inconsistent files
//! - CSV time-series sampling
//! - JSON state snapshots

use std::fs;
use std::path::PathBuf;

use photoreceptor_sim::export::{export_state_json_to, CsvExporter, StateExport, EXPORT_VERSION};
use photoreceptor_sim::{
    CellClass, ConfigError, ConstantsError, Parameters, ResponseSink, SimulationDriver,
};

/// Fresh scratch directory under the system temp dir
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("photoreceptor_sim_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_missing_parameter_dir_uses_defaults() {
    let dir = scratch_dir("missing_params").join("does_not_exist");
    let params = Parameters::load_from_dir(&dir);
    assert_eq!(params, Parameters::default());
}

#[test]
fn test_partial_parameter_dir() {
    let dir = scratch_dir("partial_params");
    fs::write(
        dir.join("simulation.json"),
        r#"{ "dt_sec": 0.0005, "substeps_per_tick": 40, "tick_interval_sec": 0.02 }"#,
    )
    .unwrap();
    fs::write(dir.join("cone.json"), "{ not json").unwrap();

    let params = Parameters::load_from_dir(&dir);

    assert_eq!(params.simulation.substeps_per_tick, 40);
    assert_eq!(params.simulation.dt_sec, 0.0005);
    // Malformed file falls back to defaults
    assert_eq!(params.cone, Default::default());
    assert_eq!(params.rod, Default::default());
    assert!(params.validate().is_ok());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_parameters_json_file_round_trip() {
    let dir = scratch_dir("params_file");
    let path = dir.join("parameters.json");

    let mut params = Parameters::default();
    params.rod.0.gain = 3.0;
    params.adapter.raw_input_max = 4095;
    params.save_json(&path).unwrap();

    let loaded = Parameters::from_json_file(&path).unwrap();
    assert_eq!(loaded, params);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_parameters_json_file_errors() {
    let dir = scratch_dir("params_errors");
    assert!(Parameters::from_json_file(dir.join("absent.json")).is_err());

    let path = dir.join("broken.json");
    fs::write(&path, "[1, 2").unwrap();
    assert!(Parameters::from_json_file(&path).is_err());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_csv_export_sampling() {
    let dir = scratch_dir("csv");
    let path = dir.join("timeseries.csv");

    let mut driver = SimulationDriver::with_defaults().unwrap();
    // One row every 100 ms of simulated time, ticks every 20 ms
    let mut exporter = CsvExporter::to_path(&path, 0.1).unwrap();
    for _ in 0..50 {
        let m = driver.tick(600.0);
        exporter.consume(&m).unwrap();
    }
    assert_eq!(exporter.records(), 10);
    let written = exporter.finish().unwrap();
    assert_eq!(written, path);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "time_sec");
    assert!(headers.iter().any(|h| h == "rod_current_pA"));
    assert!(headers.iter().any(|h| h == "combined_response"));

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 10);
    let first_time: f64 = rows[0][0].parse().unwrap();
    let last_time: f64 = rows[9][0].parse().unwrap();
    assert!((first_time - 0.02).abs() < 1e-9);
    assert!((last_time - 0.92).abs() < 1e-9);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_json_state_export() {
    let dir = scratch_dir("json");
    let path = dir.join("state.json");

    let mut driver = SimulationDriver::with_defaults().unwrap();
    let metrics = driver.advance(600.0, 1.0);
    export_state_json_to(&metrics, &path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let export: StateExport = serde_json::from_str(&contents).unwrap();
    assert_eq!(export.version, EXPORT_VERSION);
    assert_eq!(export.metrics.tick_count, metrics.tick_count);
    assert!((export.metrics.rod.current_pA - metrics.rod.current_pA).abs() < 1e-12);
    assert!((export.metrics.cone.cgmp_uM - metrics.cone.cgmp_uM).abs() < 1e-12);
    assert!(!export.exported_at.is_empty());

    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["metrics"]["regime"], "Photopic");
    assert_eq!(value["metrics"]["tick_count"], 50);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_unbalanced_parameter_file_rejected() {
    let dir = scratch_dir("unbalanced_params");
    let mut rod = photoreceptor_sim::PhysiologicalConstants::rod();
    rod.alpha_max_uM_per_sec = 30.0;
    fs::write(dir.join("rod.json"), serde_json::to_string_pretty(&rod).unwrap()).unwrap();

    let params = Parameters::load_from_dir(&dir);
    assert_eq!(params.rod.0.alpha_max_uM_per_sec, 30.0, "rod file should be loaded");

    match params.validate() {
        Err(ConfigError::Constants { cell, source }) => {
            assert_eq!(cell, CellClass::Rod);
            assert!(matches!(source, ConstantsError::DarkStateUnbalanced { .. }));
        }
        other => panic!("unbalanced dark state should be rejected, got {:?}", other),
    }
    assert!(SimulationDriver::from_parameters(&params).is_err());

    let _ = fs::remove_dir_all(&dir);
}
