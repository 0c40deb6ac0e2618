//! Dashboard application state.

use std::path::PathBuf;

use crate::dataset::Dataset;
use crate::forecast::{ForecastResult, PeakAdvisory};
use crate::io::export_forecast_csv;

/// Shortest selectable horizon in minutes.
pub const MIN_HORIZON_MINUTES: i64 = 30;
/// Longest selectable horizon in minutes.
pub const MAX_HORIZON_MINUTES: i64 = 180;
/// Horizon adjustment per key press in minutes.
pub const HORIZON_STEP_MINUTES: i64 = 5;

/// Fixed settings the dashboard starts from.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Initial horizon; snapped into the selectable range.
    pub horizon_minutes: i64,
    pub confidence_level: f64,
    pub peak_threshold_kw: f64,
    /// Where `e` writes the current forecast.
    pub export_path: PathBuf,
}

/// Dashboard application state.
///
/// Every horizon change refits the model on the full history; nothing is
/// carried over from the previous fit.
pub struct App {
    dataset: Dataset,
    settings: DashboardSettings,
    /// Selected horizon in minutes, always within
    /// `[MIN_HORIZON_MINUTES, MAX_HORIZON_MINUTES]`.
    pub horizon_minutes: i64,
    /// Latest forecast, `None` when the last fit failed.
    pub forecast: Option<ForecastResult>,
    /// Peak callout for `forecast`.
    pub advisory: Option<PeakAdvisory>,
    /// One-line message for the footer (export result or fit error).
    pub status: Option<String>,
    /// Number of fits performed so far.
    pub refits: usize,
    /// Whether the user has requested quit.
    pub quit: bool,
}

/// Clamps `minutes` into the selectable range on the step grid.
fn snap_horizon(minutes: i64) -> i64 {
    let clamped = minutes.clamp(MIN_HORIZON_MINUTES, MAX_HORIZON_MINUTES);
    clamped - (clamped - MIN_HORIZON_MINUTES) % HORIZON_STEP_MINUTES
}

impl App {
    /// Creates the app and runs the first fit.
    pub fn new(dataset: Dataset, settings: DashboardSettings) -> Self {
        let horizon_minutes = snap_horizon(settings.horizon_minutes);
        let mut app = Self {
            dataset,
            settings,
            horizon_minutes,
            forecast: None,
            advisory: None,
            status: None,
            refits: 0,
            quit: false,
        };
        app.refit();
        app
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Refits on the full history at the current horizon.
    pub fn refit(&mut self) {
        self.refits += 1;
        let outcome = self
            .dataset
            .horizon(self.horizon_minutes)
            .and_then(|h| self.dataset.forecast(h, self.settings.confidence_level));
        match outcome {
            Ok(result) => {
                self.advisory = PeakAdvisory::assess(&result, self.settings.peak_threshold_kw);
                self.forecast = Some(result);
                self.status = None;
            }
            Err(e) => {
                self.forecast = None;
                self.advisory = None;
                self.status = Some(format!("forecast failed: {e}"));
            }
        }
    }

    /// Lengthens the horizon by one step, refitting if it changed.
    pub fn extend_horizon(&mut self) {
        self.set_horizon(self.horizon_minutes + HORIZON_STEP_MINUTES);
    }

    /// Shortens the horizon by one step, refitting if it changed.
    pub fn shorten_horizon(&mut self) {
        self.set_horizon(self.horizon_minutes - HORIZON_STEP_MINUTES);
    }

    fn set_horizon(&mut self, minutes: i64) {
        let minutes = snap_horizon(minutes);
        if minutes != self.horizon_minutes {
            self.horizon_minutes = minutes;
            self.refit();
        }
    }

    /// Writes the current forecast to the configured export path.
    pub fn export(&mut self) {
        let path = &self.settings.export_path;
        let message = match self.forecast {
            Some(ref result) => match export_forecast_csv(&result.points, path) {
                Ok(()) => format!("exported {} rows to {}", result.len(), path.display()),
                Err(e) => format!("export failed: {e}"),
            },
            None => "nothing to export".to_string(),
        };
        self.status = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::LoadModel;
    use crate::sim::occupancy::{OccupancyProfile, OccupancySimulator};
    use crate::sim::types::SamplingConfig;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp");
        let sampling = SamplingConfig::new(start, 5, 120, Some(42));
        let mut sim = OccupancySimulator::new(OccupancyProfile::default(), sampling.seed);
        Dataset::simulate(&mut sim, &sampling, &LoadModel::default())
    }

    fn settings(horizon_minutes: i64, export_path: PathBuf) -> DashboardSettings {
        DashboardSettings {
            horizon_minutes,
            confidence_level: 0.95,
            peak_threshold_kw: 8.0,
            export_path,
        }
    }

    fn app(horizon_minutes: i64) -> App {
        App::new(dataset(), settings(horizon_minutes, PathBuf::from("unused.csv")))
    }

    #[test]
    fn starts_with_a_forecast() {
        let app = app(60);
        assert_eq!(app.horizon_minutes, 60);
        assert_eq!(app.refits, 1);
        assert_eq!(app.forecast.as_ref().map(ForecastResult::len), Some(12));
        assert!(app.advisory.is_some());
        assert!(app.status.is_none());
    }

    #[test]
    fn initial_horizon_is_snapped() {
        assert_eq!(app(10).horizon_minutes, MIN_HORIZON_MINUTES);
        assert_eq!(app(500).horizon_minutes, MAX_HORIZON_MINUTES);
        assert_eq!(app(62).horizon_minutes, 60);
    }

    #[test]
    fn horizon_stays_in_bounds() {
        let mut app = app(60);
        for _ in 0..50 {
            app.extend_horizon();
        }
        assert_eq!(app.horizon_minutes, MAX_HORIZON_MINUTES);
        assert_eq!(app.forecast.as_ref().map(ForecastResult::len), Some(36));

        for _ in 0..50 {
            app.shorten_horizon();
        }
        assert_eq!(app.horizon_minutes, MIN_HORIZON_MINUTES);
        assert_eq!(app.forecast.as_ref().map(ForecastResult::len), Some(6));
    }

    #[test]
    fn each_change_refits() {
        let mut app = app(60);
        app.extend_horizon();
        app.extend_horizon();
        app.shorten_horizon();
        assert_eq!(app.refits, 4);
        assert_eq!(app.horizon_minutes, 65);
        assert_eq!(app.forecast.as_ref().map(ForecastResult::len), Some(13));
    }

    #[test]
    fn no_refit_at_bound() {
        let mut app = app(MAX_HORIZON_MINUTES);
        app.extend_horizon();
        assert_eq!(app.refits, 1);
    }

    #[test]
    fn export_writes_current_forecast() {
        let path = std::env::temp_dir().join(format!(
            "occupancy-forecast-dashboard-{}.csv",
            std::process::id()
        ));
        let mut app = App::new(dataset(), settings(30, path.clone()));
        app.export();
        let written = std::fs::read_to_string(&path).unwrap_or_default();
        let _ = std::fs::remove_file(&path);
        assert_eq!(written.lines().count(), 1 + 6);
        assert!(app.status.as_deref().is_some_and(|s| s.starts_with("exported 6 rows")));
    }
}
