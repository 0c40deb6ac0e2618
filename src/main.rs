//! Occupancy forecast entry point: CLI wiring and config-driven pipeline.

use std::fmt::Display;
use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use occupancy_forecast::config::PipelineConfig;
use occupancy_forecast::dataset::Dataset;
use occupancy_forecast::forecast::PeakAdvisory;
use occupancy_forecast::io::{
    export_forecast_csv, export_load_csv, export_occupancy_csv, import_load_csv,
    import_occupancy_csv,
};
use occupancy_forecast::sim::occupancy::OccupancySimulator;

/// Forecast file written by the dashboard when `--forecast-out` is absent.
#[cfg(feature = "tui")]
const DEFAULT_DASHBOARD_EXPORT: &str = "forecast_results.csv";

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    seed_override: Option<u64>,
    horizon_override: Option<i64>,
    occupancy_in: Option<String>,
    load_in: Option<String>,
    occupancy_out: Option<String>,
    load_out: Option<String>,
    forecast_out: Option<String>,
    tui: bool,
}

fn print_help() {
    eprintln!("occupancy-forecast: classroom occupancy to electricity load forecaster");
    eprintln!();
    eprintln!("Usage: occupancy-forecast [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load pipeline settings from a TOML file");
    eprintln!("  --seed <u64>             Seed the occupancy simulator");
    eprintln!("  --occupancy-in <path>    Read occupancy from CSV instead of simulating");
    eprintln!("  --load-in <path>         Read load from CSV instead of deriving it");
    eprintln!("  --occupancy-out <path>   Write occupancy samples to CSV");
    eprintln!("  --load-out <path>        Write derived load samples to CSV");
    eprintln!("  --forecast-out <path>    Write the forecast table to CSV");
    eprintln!("  --horizon <minutes>      Forecast horizon in minutes (default: 60)");
    #[cfg(feature = "tui")]
    eprintln!("  --tui                    Open the interactive dashboard");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

fn exit_with(message: impl Display) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

/// Returns the value following `flag`, or exits.
fn value_after(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    match args.get(*i) {
        Some(v) => v.clone(),
        None => exit_with(format!("error: {flag} requires {what}")),
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        seed_override: None,
        horizon_override: None,
        occupancy_in: None,
        load_in: None,
        occupancy_out: None,
        load_out: None,
        forecast_out: None,
        tui: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => cli.config_path = Some(value_after(&args, &mut i, "--config", "a path argument")),
            "--seed" => {
                let raw = value_after(&args, &mut i, "--seed", "a u64 argument");
                match raw.parse::<u64>() {
                    Ok(s) => cli.seed_override = Some(s),
                    Err(_) => exit_with(format!("error: --seed value \"{raw}\" is not a valid u64")),
                }
            }
            "--horizon" => {
                let raw = value_after(&args, &mut i, "--horizon", "a number of minutes");
                match raw.parse::<i64>() {
                    Ok(m) => cli.horizon_override = Some(m),
                    Err(_) => exit_with(format!(
                        "error: --horizon value \"{raw}\" is not a whole number of minutes"
                    )),
                }
            }
            "--occupancy-in" => {
                cli.occupancy_in = Some(value_after(&args, &mut i, "--occupancy-in", "a path argument"));
            }
            "--load-in" => cli.load_in = Some(value_after(&args, &mut i, "--load-in", "a path argument")),
            "--occupancy-out" => {
                cli.occupancy_out = Some(value_after(&args, &mut i, "--occupancy-out", "a path argument"));
            }
            "--load-out" => cli.load_out = Some(value_after(&args, &mut i, "--load-out", "a path argument")),
            "--forecast-out" => {
                cli.forecast_out = Some(value_after(&args, &mut i, "--forecast-out", "a path argument"));
            }
            "--tui" => cli.tui = true,
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.load_in.is_some() {
        if cli.occupancy_in.is_some() {
            exit_with("error: --occupancy-in and --load-in are mutually exclusive");
        }
        if cli.occupancy_out.is_some() {
            exit_with("error: --occupancy-out has nothing to write when load comes from --load-in");
        }
    }

    cli
}

fn init_logging(quiet: bool) {
    // the dashboard owns the terminal, so only errors reach stderr there
    let default = if quiet { "error" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &CliArgs) -> PipelineConfig {
    let mut config = match cli.config_path {
        Some(ref path) => PipelineConfig::from_toml_file(Path::new(path)).unwrap_or_else(|e| exit_with(e)),
        None => PipelineConfig::default(),
    };
    if let Some(seed) = cli.seed_override {
        config.simulation.seed = Some(seed);
    }
    if let Some(minutes) = cli.horizon_override {
        config.forecast.horizon_minutes = minutes;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn build_dataset(cli: &CliArgs, config: &PipelineConfig) -> Dataset {
    let sampling = config.sampling().unwrap_or_else(|e| exit_with(e));
    let model = config.load_model();

    match (&cli.occupancy_in, &cli.load_in) {
        (Some(path), _) => {
            let occupancy = import_occupancy_csv(Path::new(path), Some(sampling.interval))
                .unwrap_or_else(|e| exit_with(format!("error: cannot read \"{path}\": {e}")));
            tracing::info!(samples = occupancy.len(), path = %path, "loaded occupancy");
            Dataset::from_occupancy(occupancy, sampling.interval, &model)
                .unwrap_or_else(|e| exit_with(format!("error: \"{path}\": {e}")))
        }
        (None, Some(path)) => {
            let load = import_load_csv(Path::new(path), Some(sampling.interval))
                .unwrap_or_else(|e| exit_with(format!("error: cannot read \"{path}\": {e}")));
            tracing::info!(samples = load.len(), path = %path, "loaded load series");
            Dataset::from_load(load, sampling.interval)
                .unwrap_or_else(|e| exit_with(format!("error: \"{path}\": {e}")))
        }
        (None, None) => {
            let mut sim = OccupancySimulator::new(config.profile(), sampling.seed);
            Dataset::simulate(&mut sim, &sampling, &model)
        }
    }
}

fn main() {
    let cli = parse_args();
    init_logging(cli.tui);

    #[cfg(not(feature = "tui"))]
    if cli.tui {
        exit_with("error: --tui requires building with `--features tui`");
    }

    let config = load_config(&cli);
    let dataset = build_dataset(&cli, &config);

    if let Some(ref path) = cli.occupancy_out {
        if let Err(e) = export_occupancy_csv(dataset.occupancy(), Path::new(path)) {
            exit_with(format!("error: failed to write occupancy CSV: {e}"));
        }
        eprintln!("Occupancy written to {path}");
    }
    if let Some(ref path) = cli.load_out {
        if let Err(e) = export_load_csv(dataset.load(), Path::new(path)) {
            exit_with(format!("error: failed to write load CSV: {e}"));
        }
        eprintln!("Load written to {path}");
    }

    let fc = &config.forecast;
    let horizon = dataset
        .horizon(fc.horizon_minutes)
        .unwrap_or_else(|e| exit_with(format!("error: {e}")));
    tracing::info!(
        steps = horizon.steps(),
        minutes = horizon.minutes(dataset.interval()),
        "forecast horizon"
    );
    let result = dataset
        .forecast(horizon, fc.confidence_level)
        .unwrap_or_else(|e| exit_with(format!("error: {e}")));

    // the dashboard shows the same report on the alternate screen
    if !cli.tui {
        println!("{result}");
        if let Some(advisory) = PeakAdvisory::assess(&result, fc.peak_threshold_kw) {
            println!("\n{advisory}");
        }
    }

    if let Some(ref path) = cli.forecast_out {
        if let Err(e) = export_forecast_csv(&result.points, Path::new(path)) {
            exit_with(format!("error: failed to write forecast CSV: {e}"));
        }
        eprintln!("Forecast written to {path}");
    }

    #[cfg(feature = "tui")]
    if cli.tui {
        use std::path::PathBuf;

        let export_path = cli
            .forecast_out
            .as_deref()
            .map_or_else(|| PathBuf::from(DEFAULT_DASHBOARD_EXPORT), PathBuf::from);
        let settings = occupancy_forecast::tui::runtime::DashboardSettings {
            horizon_minutes: fc.horizon_minutes,
            confidence_level: fc.confidence_level,
            peak_threshold_kw: fc.peak_threshold_kw,
            export_path,
        };
        occupancy_forecast::tui::run(dataset, settings);
    }
}
