//! Synthetic classroom Wi-Fi occupancy generator.

use std::ops::Range;

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::clock::Clock;
use super::types::{OccupancySample, SamplingConfig};

/// Hour-of-day classification and device-count ranges for a classroom.
///
/// Hours in `[class_start_hour, class_end_hour]` (inclusive) are class
/// hours; every other hour is off-hours. Device counts are drawn uniformly
/// from the half-open range of the matching period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyProfile {
    /// First class hour (inclusive, 0-23).
    pub class_start_hour: u32,
    /// Last class hour (inclusive, 0-23).
    pub class_end_hour: u32,
    /// Device count range during class hours.
    pub class_devices: Range<u32>,
    /// Device count range outside class hours.
    pub idle_devices: Range<u32>,
}

impl Default for OccupancyProfile {
    fn default() -> Self {
        Self {
            class_start_hour: 9,
            class_end_hour: 16,
            class_devices: 20..50,
            idle_devices: 0..5,
        }
    }
}

impl OccupancyProfile {
    /// Returns `true` when `hour` falls inside class hours.
    pub fn is_class_hour(&self, hour: u32) -> bool {
        (self.class_start_hour..=self.class_end_hour).contains(&hour)
    }

    /// Device-count range that applies at `timestamp`.
    pub fn range_at(&self, timestamp: NaiveDateTime) -> Range<u32> {
        if self.is_class_hour(timestamp.hour()) {
            self.class_devices.clone()
        } else {
            self.idle_devices.clone()
        }
    }
}

/// Bimodal occupancy simulator.
///
/// Owns its random number generator so a seeded simulator always yields
/// the same sequence, while an unseeded one behaves like a live classroom.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use occupancy_forecast::sim::occupancy::{OccupancyProfile, OccupancySimulator};
/// use occupancy_forecast::sim::types::SamplingConfig;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1)
///     .and_then(|d| d.and_hms_opt(8, 0, 0))
///     .unwrap();
/// let sampling = SamplingConfig::new(start, 5, 120, Some(42));
/// let mut sim = OccupancySimulator::new(OccupancyProfile::default(), sampling.seed);
/// let samples = sim.generate(&sampling);
/// assert_eq!(samples.len(), 120);
/// ```
#[derive(Debug, Clone)]
pub struct OccupancySimulator {
    profile: OccupancyProfile,
    rng: StdRng,
}

impl OccupancySimulator {
    /// Creates a simulator.
    ///
    /// # Arguments
    ///
    /// * `profile` - Class-hour window and device-count ranges
    /// * `seed` - Random seed; `None` seeds from operating-system entropy
    pub fn new(profile: OccupancyProfile, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(profile, rng)
    }

    /// Creates a simulator driven by a caller-supplied generator.
    pub fn with_rng(profile: OccupancyProfile, rng: StdRng) -> Self {
        Self { profile, rng }
    }

    /// Draws the device count for one timestamp.
    ///
    /// An empty range (`start >= end`) yields its lower bound.
    pub fn devices_at(&mut self, timestamp: NaiveDateTime) -> u32 {
        let range = self.profile.range_at(timestamp);
        if range.is_empty() {
            return range.start;
        }
        self.rng.random_range(range)
    }

    /// Generates `sampling.samples` samples starting at `sampling.start`.
    pub fn generate(&mut self, sampling: &SamplingConfig) -> Vec<OccupancySample> {
        self.generate_from(sampling.start, sampling.interval, sampling.samples)
    }

    /// Generates `count` samples at a fixed `interval` starting at `start`.
    pub fn generate_from(
        &mut self,
        start: NaiveDateTime,
        interval: TimeDelta,
        count: usize,
    ) -> Vec<OccupancySample> {
        let mut samples = Vec::with_capacity(count);
        Clock::new(start, interval, count).run(|_, timestamp| {
            samples.push(OccupancySample {
                timestamp,
                connected_devices: self.devices_at(timestamp),
            });
        });
        tracing::debug!(count = samples.len(), %start, "generated occupancy samples");
        samples
    }
}
