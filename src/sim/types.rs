//! Core sample types and sampling configuration shared by every pipeline stage.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};

/// Timestamp layout used for every CSV artifact and report line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layouts accepted when reading timestamps back in.
const ACCEPTED_FORMATS: [&str; 4] = [
    TIMESTAMP_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO-like naive timestamp (`YYYY-MM-DD HH:MM[:SS]`, space or `T`).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Centralized sampling configuration.
///
/// The simulator and the forecast engine both derive timestamps from this
/// struct, so the cadence is defined in exactly one place.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use occupancy_forecast::sim::types::SamplingConfig;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1)
///     .and_then(|d| d.and_hms_opt(8, 0, 0))
///     .unwrap();
/// let cfg = SamplingConfig::new(start, 5, 120, Some(42));
/// assert_eq!(cfg.interval.num_minutes(), 5);
/// assert_eq!(cfg.span().num_hours(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Timestamp of the first sample (naive local time).
    pub start: NaiveDateTime,
    /// Fixed spacing between consecutive samples.
    pub interval: TimeDelta,
    /// Number of samples to generate.
    pub samples: usize,
    /// Optional seed; `None` draws entropy from the OS.
    pub seed: Option<u64>,
}

impl SamplingConfig {
    /// Creates a new sampling configuration.
    ///
    /// # Arguments
    ///
    /// * `start` - Timestamp of the first sample
    /// * `interval_minutes` - Sampling interval in minutes (must be > 0)
    /// * `samples` - Number of samples to generate
    /// * `seed` - Optional random seed for reproducible runs
    ///
    /// # Panics
    ///
    /// Panics if `interval_minutes` is zero.
    pub fn new(start: NaiveDateTime, interval_minutes: u32, samples: usize, seed: Option<u64>) -> Self {
        assert!(interval_minutes > 0, "interval_minutes must be > 0");
        Self {
            start,
            interval: TimeDelta::minutes(i64::from(interval_minutes)),
            samples,
            seed,
        }
    }

    /// Wall-clock time covered by all samples (`samples * interval`).
    pub fn span(&self) -> TimeDelta {
        self.interval * i32::try_from(self.samples).unwrap_or(i32::MAX)
    }
}

/// Number of connected Wi-Fi devices observed at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancySample {
    pub timestamp: NaiveDateTime,
    pub connected_devices: u32,
}

/// Electricity load derived from an [`OccupancySample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSample {
    pub timestamp: NaiveDateTime,
    /// Load in kilowatts.
    pub electricity_kw: f64,
}

impl fmt::Display for OccupancySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | devices={:>3}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.connected_devices
        )
    }
}

impl fmt::Display for LoadSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | load={:>6.2} kW",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.electricity_kw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn eight_am() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn sampling_config_basic() {
        let cfg = SamplingConfig::new(eight_am(), 5, 120, Some(7));
        assert_eq!(cfg.interval, TimeDelta::minutes(5));
        assert_eq!(cfg.samples, 120);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.span(), TimeDelta::hours(10));
    }

    #[test]
    #[should_panic]
    fn sampling_config_zero_interval_panics() {
        SamplingConfig::new(eight_am(), 0, 10, None);
    }

    #[test]
    fn parse_timestamp_accepts_iso_variants() {
        for raw in [
            "2025-01-01 08:00:00",
            "2025-01-01T08:00:00",
            "2025-01-01 08:00",
            " 2025-01-01T08:00 ",
        ] {
            assert_eq!(parse_timestamp(raw), Some(eight_am()), "failed on {raw:?}");
        }
        assert_eq!(parse_timestamp("01/01/2025 8am"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn sample_display_uses_timestamp_format() {
        let s = LoadSample {
            timestamp: eight_am(),
            electricity_kw: 2.15,
        };
        assert_eq!(format!("{s}"), "2025-01-01 08:00:00 | load=  2.15 kW");
    }
}
