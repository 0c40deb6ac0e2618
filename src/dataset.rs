//! Per-run dataset context.
//!
//! A [`Dataset`] owns the occupancy and load series of one run and is
//! passed explicitly to the forecaster, the report, and the dashboard.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{ForecastError, InputError};
use crate::forecast::{ForecastResult, Horizon, compute_forecast};
use crate::io::import::check_timestamps;
use crate::load::LoadModel;
use crate::sim::occupancy::OccupancySimulator;
use crate::sim::types::{LoadSample, OccupancySample, SamplingConfig};

/// Occupancy and load history for one run, at a single fixed interval.
///
/// `occupancy` is empty when the dataset was built from a load file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    occupancy: Vec<OccupancySample>,
    load: Vec<LoadSample>,
    interval: TimeDelta,
}

impl Dataset {
    /// Simulates occupancy over `sampling` and derives its load.
    pub fn simulate(sim: &mut OccupancySimulator, sampling: &SamplingConfig, model: &LoadModel) -> Self {
        let occupancy = sim.generate(sampling);
        let load = model.derive(&occupancy);
        tracing::info!(
            samples = occupancy.len(),
            start = %sampling.start,
            interval_minutes = sampling.interval.num_minutes(),
            "simulated occupancy"
        );
        Self {
            occupancy,
            load,
            interval: sampling.interval,
        }
    }

    /// Wraps observed occupancy and derives its load.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] for an empty series or timestamps that are
    /// not strictly increasing at `interval`.
    pub fn from_occupancy(
        occupancy: Vec<OccupancySample>,
        interval: TimeDelta,
        model: &LoadModel,
    ) -> Result<Self, InputError> {
        if occupancy.is_empty() {
            return Err(InputError::Empty);
        }
        check_timestamps(occupancy.iter().map(|s| s.timestamp), Some(interval))?;
        let load = model.derive(&occupancy);
        Ok(Self {
            occupancy,
            load,
            interval,
        })
    }

    /// Wraps an observed load series with no occupancy behind it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Dataset::from_occupancy`].
    pub fn from_load(load: Vec<LoadSample>, interval: TimeDelta) -> Result<Self, InputError> {
        if load.is_empty() {
            return Err(InputError::Empty);
        }
        check_timestamps(load.iter().map(|s| s.timestamp), Some(interval))?;
        Ok(Self {
            occupancy: Vec::new(),
            load,
            interval,
        })
    }

    pub fn occupancy(&self) -> &[OccupancySample] {
        &self.occupancy
    }

    pub fn load(&self) -> &[LoadSample] {
        &self.load
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.load.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load.is_empty()
    }

    /// Timestamp of the last observation.
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.load.last().map(|s| s.timestamp)
    }

    /// Converts a horizon in minutes at this dataset's interval.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidHorizon`] when fewer than one
    /// interval or more than [`MAX_HORIZON_STEPS`] are covered.
    pub fn horizon(&self, minutes: i64) -> Result<Horizon, ForecastError> {
        Horizon::from_minutes(minutes, self.interval)
    }

    /// Refits on the full load history and forecasts `horizon` steps.
    ///
    /// # Errors
    ///
    /// See [`compute_forecast`].
    pub fn forecast(&self, horizon: Horizon, confidence_level: f64) -> Result<ForecastResult, ForecastError> {
        compute_forecast(&self.load, horizon.steps(), confidence_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::occupancy::OccupancyProfile;
    use chrono::NaiveDate;

    fn sampling(seed: u64) -> SamplingConfig {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp");
        SamplingConfig::new(start, 5, 120, Some(seed))
    }

    fn simulated(seed: u64) -> Dataset {
        let sampling = sampling(seed);
        let mut sim = OccupancySimulator::new(OccupancyProfile::default(), sampling.seed);
        Dataset::simulate(&mut sim, &sampling, &LoadModel::default())
    }

    #[test]
    fn simulate_pairs_load_with_occupancy() {
        let ds = simulated(42);
        assert_eq!(ds.len(), 120);
        assert_eq!(ds.occupancy().len(), ds.load().len());
        for (o, l) in ds.occupancy().iter().zip(ds.load()) {
            assert_eq!(o.timestamp, l.timestamp);
            assert_eq!(l.electricity_kw, LoadModel::default().load_kw(o.connected_devices));
        }
        let last = ds.last_timestamp().expect("non-empty");
        assert_eq!(last.to_string(), "2025-01-01 17:55:00");
    }

    #[test]
    fn same_seed_same_dataset() {
        assert_eq!(simulated(7), simulated(7));
    }

    #[test]
    fn from_occupancy_checks_cadence() {
        let mut occupancy = simulated(1).occupancy().to_vec();
        occupancy[3].timestamp += TimeDelta::minutes(2);
        let err = Dataset::from_occupancy(occupancy, TimeDelta::minutes(5), &LoadModel::default()).err();
        assert!(matches!(err, Some(InputError::IrregularCadence { row: 4, .. })), "{err:?}");
    }

    #[test]
    fn from_load_rejects_empty() {
        let err = Dataset::from_load(Vec::new(), TimeDelta::minutes(5)).err();
        assert!(matches!(err, Some(InputError::Empty)));
    }

    #[test]
    fn from_load_has_no_occupancy() {
        let load = simulated(3).load().to_vec();
        let ds = Dataset::from_load(load, TimeDelta::minutes(5)).expect("valid series");
        assert!(ds.occupancy().is_empty());
        assert_eq!(ds.len(), 120);
    }

    #[test]
    fn forecast_uses_full_history() {
        let ds = simulated(42);
        let horizon = ds.horizon(60).expect("valid horizon");
        let result = ds.forecast(horizon, 0.95).expect("forecast should succeed");
        assert_eq!(result.len(), 12);
        assert_eq!(result.model.observations, 120);
        assert_eq!(
            result.points[0].timestamp,
            ds.last_timestamp().expect("non-empty") + TimeDelta::minutes(5)
        );
    }

    #[test]
    fn horizon_shorter_than_interval_rejected() {
        let ds = simulated(42);
        assert!(matches!(ds.horizon(3), Err(ForecastError::InvalidHorizon(0))));
    }
}
