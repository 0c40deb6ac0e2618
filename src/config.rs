//! TOML-based pipeline configuration.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::forecast::{DEFAULT_CONFIDENCE_LEVEL, MAX_HORIZON_STEPS};
use crate::forecast::peak::DEFAULT_PEAK_THRESHOLD_KW;
use crate::load::{DEFAULT_BASE_LOAD_KW, DEFAULT_POWER_PER_DEVICE_KW, LoadModel};
use crate::sim::occupancy::OccupancyProfile;
use crate::sim::types::{SamplingConfig, parse_timestamp};

/// Top-level pipeline configuration parsed from TOML.
///
/// All fields have defaults matching the classroom scenario: 120 samples
/// every 5 minutes from 2025-01-01 08:00, a 60 minute forecast at 95%.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Sampling window and occupancy ranges.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Occupancy to load conversion constants.
    #[serde(default)]
    pub load: LoadConfig,
    /// Forecast horizon, interval level and peak threshold.
    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// Sampling window and occupancy ranges.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First timestamp, `YYYY-MM-DD HH:MM[:SS]`.
    pub start: String,
    /// Minutes between samples (must be > 0).
    pub interval_minutes: u32,
    /// Number of samples to generate.
    pub samples: usize,
    /// Random seed; omit for a fresh run every time.
    pub seed: Option<u64>,
    /// First class hour (inclusive).
    pub class_start_hour: u32,
    /// Last class hour (inclusive).
    pub class_end_hour: u32,
    /// Lower bound of class-hour device counts (inclusive).
    pub class_devices_min: u32,
    /// Upper bound of class-hour device counts (exclusive).
    pub class_devices_max: u32,
    /// Lower bound of off-hour device counts (inclusive).
    pub idle_devices_min: u32,
    /// Upper bound of off-hour device counts (exclusive).
    pub idle_devices_max: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: "2025-01-01 08:00:00".to_string(),
            interval_minutes: 5,
            samples: 120,
            seed: None,
            class_start_hour: 9,
            class_end_hour: 16,
            class_devices_min: 20,
            class_devices_max: 50,
            idle_devices_min: 0,
            idle_devices_max: 5,
        }
    }
}

/// Occupancy to load conversion constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Load with no devices connected (kW).
    pub base_load_kw: f64,
    /// Incremental load per connected device (kW).
    pub power_per_device_kw: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_load_kw: DEFAULT_BASE_LOAD_KW,
            power_per_device_kw: DEFAULT_POWER_PER_DEVICE_KW,
        }
    }
}

/// Forecast horizon, interval level and peak threshold.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Horizon in minutes; divided by the sampling interval and floored.
    pub horizon_minutes: i64,
    /// Two-sided confidence level in `(0, 1)`.
    pub confidence_level: f64,
    /// Peak load (kW) above which the advisory fires.
    pub peak_threshold_kw: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_minutes: 60,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            peak_threshold_kw: DEFAULT_PEAK_THRESHOLD_KW,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.interval_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl PipelineConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigError {
                field: field.into(),
                message,
            });
        };

        let s = &self.simulation;
        if parse_timestamp(&s.start).is_none() {
            push(
                "simulation.start",
                format!("must look like \"YYYY-MM-DD HH:MM:SS\", got \"{}\"", s.start),
            );
        }
        if s.interval_minutes == 0 {
            push("simulation.interval_minutes", "must be > 0".into());
        }
        if s.class_end_hour > 23 {
            push("simulation.class_end_hour", "must be <= 23".into());
        }
        if s.class_start_hour > s.class_end_hour {
            push(
                "simulation.class_start_hour",
                "must be <= simulation.class_end_hour".into(),
            );
        }
        if s.class_devices_min >= s.class_devices_max {
            push(
                "simulation.class_devices_min",
                "must be < simulation.class_devices_max".into(),
            );
        }
        if s.idle_devices_min >= s.idle_devices_max {
            push(
                "simulation.idle_devices_min",
                "must be < simulation.idle_devices_max".into(),
            );
        }

        let l = &self.load;
        if !(l.base_load_kw.is_finite() && l.base_load_kw >= 0.0) {
            push("load.base_load_kw", "must be finite and >= 0".into());
        }
        if !(l.power_per_device_kw.is_finite() && l.power_per_device_kw >= 0.0) {
            push("load.power_per_device_kw", "must be finite and >= 0".into());
        }

        let f = &self.forecast;
        let interval = i64::from(s.interval_minutes.max(1));
        let max_steps = MAX_HORIZON_STEPS as i64;
        if f.horizon_minutes < interval {
            push(
                "forecast.horizon_minutes",
                "must cover at least one sampling interval".into(),
            );
        } else if f.horizon_minutes / interval > max_steps {
            push(
                "forecast.horizon_minutes",
                format!("must be at most {} ({max_steps} intervals)", interval * max_steps),
            );
        }
        if !(f.confidence_level > 0.0 && f.confidence_level < 1.0) {
            push("forecast.confidence_level", "must be in (0.0, 1.0)".into());
        }
        if !f.peak_threshold_kw.is_finite() {
            push("forecast.peak_threshold_kw", "must be finite".into());
        }

        errors
    }

    /// Builds the sampling window.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `simulation.start` does not parse or the
    /// interval is zero.
    pub fn sampling(&self) -> Result<SamplingConfig, ConfigError> {
        let s = &self.simulation;
        let start = parse_timestamp(&s.start).ok_or_else(|| ConfigError {
            field: "simulation.start".into(),
            message: format!("cannot parse \"{}\"", s.start),
        })?;
        if s.interval_minutes == 0 {
            return Err(ConfigError {
                field: "simulation.interval_minutes".into(),
                message: "must be > 0".into(),
            });
        }
        Ok(SamplingConfig::new(start, s.interval_minutes, s.samples, s.seed))
    }

    /// Builds the occupancy profile from the simulation section.
    pub fn profile(&self) -> OccupancyProfile {
        let s = &self.simulation;
        OccupancyProfile {
            class_start_hour: s.class_start_hour,
            class_end_hour: s.class_end_hour,
            class_devices: s.class_devices_min..s.class_devices_max,
            idle_devices: s.idle_devices_min..s.idle_devices_max,
        }
    }

    /// Builds the load model from the load section.
    pub fn load_model(&self) -> LoadModel {
        LoadModel::new(self.load.base_load_kw, self.load.power_per_device_kw)
    }
}
