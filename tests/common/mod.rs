//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use occupancy_forecast::dataset::Dataset;
use occupancy_forecast::load::LoadModel;
use occupancy_forecast::sim::occupancy::{OccupancyProfile, OccupancySimulator};
use occupancy_forecast::sim::types::SamplingConfig;

/// 2025-01-01 08:00, the start of the classroom day.
pub fn day_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid timestamp")
}

/// 120 samples every 5 minutes from 08:00 with the given seed.
pub fn classroom_sampling(seed: u64) -> SamplingConfig {
    SamplingConfig::new(day_start(), 5, 120, Some(seed))
}

/// Seeded classroom dataset with default profile and load constants.
pub fn classroom_dataset(seed: u64) -> Dataset {
    let sampling = classroom_sampling(seed);
    let mut sim = OccupancySimulator::new(OccupancyProfile::default(), sampling.seed);
    Dataset::simulate(&mut sim, &sampling, &LoadModel::default())
}

/// Unique scratch file path under the system temp directory.
pub fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("occupancy-forecast-{}-{name}", std::process::id()))
}
