//! Tests that drive the `occupancy-forecast` binary.

mod common;

use std::path::Path;
use std::process::{Command, Output};

use chrono::TimeDelta;

use occupancy_forecast::dataset::Dataset;
use occupancy_forecast::io::import_load_csv;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_occupancy-forecast"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("binary should launch")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp path is UTF-8")
}

#[test]
fn seeded_run_writes_forecast_file() {
    let out = common::scratch_path("cli-forecast.csv");
    let output = run(&["--seed", "42", "--horizon", "60", "--forecast-out", path_arg(&out)]);
    let written = std::fs::read_to_string(&out).unwrap_or_default();
    let _ = std::fs::remove_file(&out);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 1 + 12);
    assert_eq!(lines[0], "Time,Forecast (kW),Lower CI,Upper CI");
    assert!(lines[1].starts_with("2025-01-01 18:00:00,"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Forecast: next 60 minutes (95% CI) ---"));
    assert!(stdout.contains("Predicted peak load in next 60 minutes"));
}

#[test]
fn same_seed_same_output() {
    let a = run(&["--seed", "3", "--horizon", "30"]);
    let b = run(&["--seed", "3", "--horizon", "30"]);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn occupancy_file_can_be_fed_back_in() {
    let occupancy = common::scratch_path("cli-occupancy.csv");
    let load = common::scratch_path("cli-load.csv");
    let first = run(&[
        "--seed",
        "8",
        "--occupancy-out",
        path_arg(&occupancy),
        "--load-out",
        path_arg(&load),
    ]);
    let second = run(&["--occupancy-in", path_arg(&occupancy)]);
    let load_text = std::fs::read_to_string(&load).unwrap_or_default();
    let _ = std::fs::remove_file(&occupancy);
    let _ = std::fs::remove_file(&load);

    assert!(first.status.success());
    assert!(second.status.success(), "{}", String::from_utf8_lossy(&second.stderr));
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(load_text.lines().next(), Some("timestamp,electricity_kW"));
    assert_eq!(load_text.lines().count(), 1 + 120);
}

#[test]
fn bundled_config_runs() {
    let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/classroom.toml");
    let output = run(&["--config", path_arg(&config)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn zero_horizon_fails() {
    let output = run(&["--seed", "1", "--horizon", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("forecast.horizon_minutes"));
}

#[test]
fn oversized_horizon_fails_cleanly() {
    for horizon in ["1445", "100000000000", "9223372036854775807"] {
        let output = run(&["--seed", "1", "--horizon", horizon]);
        assert_eq!(output.status.code(), Some(1), "--horizon {horizon}");
        assert!(
            String::from_utf8_lossy(&output.stderr).contains("forecast.horizon_minutes"),
            "--horizon {horizon}"
        );
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn longest_horizon_runs() {
    let output = run(&["--seed", "1", "--horizon", "1440"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("next 1440 minutes"));
}

#[test]
fn load_file_can_be_fed_back_in() {
    let load = common::scratch_path("cli-load-in.csv");
    let forecast = common::scratch_path("cli-load-in-forecast.csv");
    let first = run(&["--seed", "8", "--load-out", path_arg(&load)]);
    let second = run(&["--load-in", path_arg(&load), "--forecast-out", path_arg(&forecast)]);

    let reloaded = import_load_csv(&load, Some(TimeDelta::minutes(5)))
        .map_err(|e| e.to_string())
        .and_then(|l| Dataset::from_load(l, TimeDelta::minutes(5)).map_err(|e| e.to_string()));
    let written = std::fs::read_to_string(&forecast).unwrap_or_default();
    let _ = std::fs::remove_file(&load);
    let _ = std::fs::remove_file(&forecast);

    assert!(first.status.success());
    assert!(second.status.success(), "{}", String::from_utf8_lossy(&second.stderr));

    let dataset = reloaded.expect("load file should re-import");
    assert_eq!(dataset.len(), 120);
    assert!(dataset.occupancy().is_empty());
    let expected = dataset
        .horizon(60)
        .and_then(|h| dataset.forecast(h, 0.95))
        .expect("forecast should succeed");
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains(&expected.to_string()), "{stdout}");
    assert_eq!(written.lines().count(), 1 + 12);
}

#[test]
fn load_and_occupancy_inputs_conflict() {
    let output = run(&["--occupancy-in", "a.csv", "--load-in", "b.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("mutually exclusive"));

    let output = run(&["--load-in", "b.csv", "--occupancy-out", "c.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--occupancy-out"));
}

#[test]
fn missing_load_file_fails() {
    let missing = common::scratch_path("cli-no-such-load.csv");
    let output = run(&["--load-in", path_arg(&missing)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
}

#[cfg(not(feature = "tui"))]
#[test]
fn dashboard_flag_without_feature_prints_no_report() {
    let output = run(&["--seed", "1", "--tui"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--features tui"));
}

#[test]
fn malformed_occupancy_file_fails() {
    let bad = common::scratch_path("cli-bad.csv");
    std::fs::write(&bad, "timestamp,connected_devices\n2025-01-01 08:00:00,lots\n")
        .expect("scratch file should be writable");
    let output = run(&["--occupancy-in", path_arg(&bad)]);
    let _ = std::fs::remove_file(&bad);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("connected_devices"));
}

#[test]
fn unknown_argument_fails() {
    let output = run(&["--bogus"]);
    assert_eq!(output.status.code(), Some(1));
}
