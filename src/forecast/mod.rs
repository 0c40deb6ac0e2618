//! Short-horizon load forecasting.
//!
//! [`compute_forecast`] is the single entry point used by the CLI and the
//! dashboard: it validates its arguments, fits a fresh ARIMA(1,1,1) model to
//! the full history, and projects `horizon` steps ahead with two-sided
//! confidence bounds. Nothing is cached between calls.

pub mod arima;
pub mod peak;

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{FitError, ForecastError, InputError};
use crate::sim::clock::Clock;
use crate::sim::types::{LoadSample, TIMESTAMP_FORMAT};

pub use arima::{Arima111, MIN_OBSERVATIONS, Projection};
pub use peak::PeakAdvisory;

/// Default two-sided confidence level.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Longest accepted horizon in steps: one day at a 5-minute cadence.
pub const MAX_HORIZON_STEPS: usize = 288;

/// One forecast step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    /// Point forecast (kW).
    pub forecast: f64,
    /// Lower confidence bound (kW).
    pub lower: f64,
    /// Upper confidence bound (kW).
    pub upper: f64,
}

/// Read-only description of the model a forecast came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSummary {
    pub phi: f64,
    pub theta: f64,
    /// Drift per interval on the load scale.
    pub intercept: f64,
    pub sigma2: f64,
    pub aic: Option<f64>,
    pub observations: usize,
}

impl From<&Arima111> for ModelSummary {
    fn from(m: &Arima111) -> Self {
        Self {
            phi: m.phi,
            theta: m.theta,
            intercept: m.intercept,
            sigma2: m.sigma2,
            aic: m.aic,
            observations: m.observations,
        }
    }
}

/// Output of one fit-and-forecast call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// One point per forecast step, continuing the history's cadence.
    pub points: Vec<ForecastPoint>,
    /// Confidence level the bounds were computed at.
    pub confidence_level: f64,
    /// Spacing between forecast steps.
    pub interval: TimeDelta,
    pub model: ModelSummary,
}

impl ForecastResult {
    /// Number of forecast steps.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Wall-clock span covered by the forecast.
    pub fn span(&self) -> TimeDelta {
        self.interval * i32::try_from(self.points.len()).unwrap_or(i32::MAX)
    }

    /// Step with the highest point forecast (earliest on ties).
    pub fn peak(&self) -> Option<&ForecastPoint> {
        self.points
            .iter()
            .reduce(|best, p| if p.forecast > best.forecast { p } else { best })
    }
}

impl fmt::Display for ForecastPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | forecast={:>6.2} kW  [{:>6.2}, {:>6.2}]",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.forecast,
            self.lower,
            self.upper
        )
    }
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- Forecast: next {} minutes ({:.0}% CI) ---",
            self.span().num_minutes(),
            self.confidence_level * 100.0
        )?;
        writeln!(
            f,
            "ARIMA(1,1,1): phi={:.4}  theta={:.4}  drift={:.4}  sigma2={:.4}  n={}",
            self.model.phi,
            self.model.theta,
            self.model.intercept,
            self.model.sigma2,
            self.model.observations
        )?;
        for p in &self.points {
            writeln!(f, "{p}")?;
        }
        Ok(())
    }
}

/// Converts a horizon in minutes into a step count.
///
/// The division floors, as the dashboard slider does; a result of zero
/// steps is rejected like any other non-positive horizon.
///
/// # Errors
///
/// Returns [`ForecastError::InvalidHorizon`] when `minutes` is not positive,
/// is shorter than one interval, or spans more than [`MAX_HORIZON_STEPS`].
pub fn steps_from_minutes(minutes: i64, interval: TimeDelta) -> Result<usize, ForecastError> {
    let interval_minutes = interval.num_minutes();
    if minutes <= 0 || interval_minutes <= 0 {
        return Err(ForecastError::InvalidHorizon(minutes));
    }
    let steps = minutes / interval_minutes;
    if steps == 0 {
        return Err(ForecastError::InvalidHorizon(steps));
    }
    usize::try_from(steps)
        .map_err(|_| ForecastError::InvalidHorizon(minutes))
        .and_then(check_steps)
}

fn check_steps(steps: usize) -> Result<usize, ForecastError> {
    if steps == 0 || steps > MAX_HORIZON_STEPS {
        return Err(ForecastError::InvalidHorizon(
            i64::try_from(steps).unwrap_or(i64::MAX),
        ));
    }
    Ok(steps)
}

/// A validated, positive number of forecast steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    steps: usize,
}

impl Horizon {
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidHorizon`] for zero steps or more
    /// than [`MAX_HORIZON_STEPS`].
    pub fn from_steps(steps: usize) -> Result<Self, ForecastError> {
        check_steps(steps).map(|steps| Self { steps })
    }

    /// Builds a horizon from minutes via [`steps_from_minutes`].
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidHorizon`] when fewer than one
    /// interval or more than [`MAX_HORIZON_STEPS`] are covered.
    pub fn from_minutes(minutes: i64, interval: TimeDelta) -> Result<Self, ForecastError> {
        steps_from_minutes(minutes, interval).map(|steps| Self { steps })
    }

    pub fn steps(self) -> usize {
        self.steps
    }

    /// Minutes covered at the given interval.
    pub fn minutes(self, interval: TimeDelta) -> i64 {
        interval.num_minutes() * self.steps as i64
    }
}

/// Fits ARIMA(1,1,1) to `history` and forecasts `horizon` steps ahead.
///
/// Arguments are checked in order: horizon, confidence level, history
/// length, history cadence. Only then is the model fitted.
///
/// # Arguments
///
/// * `history` - Ordered, evenly spaced load samples
/// * `horizon` - Number of future intervals to forecast, `1..=MAX_HORIZON_STEPS`
/// * `confidence_level` - Two-sided level in `(0, 1)`, e.g. `0.95`
///
/// # Errors
///
/// * [`ForecastError::InvalidHorizon`] / [`ForecastError::InvalidConfidence`] - bad parameters
/// * [`ForecastError::Fit`] - history too short or the model could not be fitted
/// * [`ForecastError::History`] - timestamps not strictly increasing at a fixed step
pub fn compute_forecast(
    history: &[LoadSample],
    horizon: usize,
    confidence_level: f64,
) -> Result<ForecastResult, ForecastError> {
    check_steps(horizon)?;
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ForecastError::InvalidConfidence(confidence_level));
    }
    if history.len() < MIN_OBSERVATIONS {
        return Err(FitError::InsufficientHistory {
            required: MIN_OBSERVATIONS,
            actual: history.len(),
        }
        .into());
    }
    let interval = series_interval(history)?;

    let model = Arima111::fit(history)?;
    let projection = model.forecast(horizon, confidence_level)?;

    let last = history[history.len() - 1].timestamp;
    let points: Vec<ForecastPoint> = Clock::continuing(last, interval, horizon)
        .zip(projection.iter())
        .map(|(timestamp, (forecast, lower, upper))| ForecastPoint {
            timestamp,
            forecast,
            lower,
            upper,
        })
        .collect();

    tracing::info!(
        horizon,
        observations = history.len(),
        phi = model.phi,
        theta = model.theta,
        "forecast computed"
    );

    Ok(ForecastResult {
        points,
        confidence_level,
        interval,
        model: ModelSummary::from(&model),
    })
}

/// Returns the fixed step of `history`, or the first row that breaks it.
fn series_interval(history: &[LoadSample]) -> Result<TimeDelta, InputError> {
    let interval = history[1].timestamp - history[0].timestamp;
    for (i, pair) in history.windows(2).enumerate() {
        let step = pair[1].timestamp - pair[0].timestamp;
        if step <= TimeDelta::zero() {
            return Err(InputError::NonMonotonic {
                row: i + 1,
                previous: pair[0].timestamp,
                timestamp: pair[1].timestamp,
            });
        }
        if step != interval {
            return Err(InputError::irregular(i + 1, interval, step));
        }
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp")
    }

    fn history(values: &[f64]) -> Vec<LoadSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| LoadSample {
                timestamp: start() + TimeDelta::minutes(5 * i as i64),
                electricity_kw: v,
            })
            .collect()
    }

    fn wiggly(n: usize) -> Vec<LoadSample> {
        let values: Vec<f64> = (0..n)
            .map(|i| 5.0 + (i as f64 * 0.7).sin() + 0.3 * (i as f64 * 2.3).cos())
            .collect();
        history(&values)
    }

    #[test]
    fn rejects_zero_horizon_before_fitting() {
        // two points would fail the fit; the horizon check must come first
        let err = compute_forecast(&history(&[1.0, 2.0]), 0, 0.95).err();
        assert!(matches!(err, Some(ForecastError::InvalidHorizon(0))), "{err:?}");
    }

    #[test]
    fn rejects_bad_confidence() {
        for level in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let err = compute_forecast(&wiggly(30), 3, level).err();
            assert!(matches!(err, Some(ForecastError::InvalidConfidence(_))), "{level}");
        }
    }

    #[test]
    fn short_history_is_a_fit_error() {
        let err = compute_forecast(&history(&[1.0, 2.0, 1.5]), 3, 0.95).err();
        assert!(
            matches!(
                err,
                Some(ForecastError::Fit(FitError::InsufficientHistory { required: 4, actual: 3 }))
            ),
            "{err:?}"
        );
    }

    #[test]
    fn constant_history_is_a_fit_error() {
        let err = compute_forecast(&history(&[4.0; 40]), 3, 0.95).err();
        assert!(
            matches!(err, Some(ForecastError::Fit(FitError::DegenerateSeries))),
            "{err:?}"
        );
    }

    #[test]
    fn irregular_history_is_an_input_error() {
        let mut h = wiggly(20);
        h[10].timestamp += TimeDelta::minutes(1);
        let err = compute_forecast(&h, 3, 0.95).err();
        assert!(
            matches!(err, Some(ForecastError::History(InputError::IrregularCadence { row: 10, .. }))),
            "{err:?}"
        );
    }

    #[test]
    fn non_monotonic_history_is_an_input_error() {
        let mut h = wiggly(20);
        h[5].timestamp = h[4].timestamp;
        let err = compute_forecast(&h, 3, 0.95).err();
        assert!(
            matches!(err, Some(ForecastError::History(InputError::NonMonotonic { row: 5, .. }))),
            "{err:?}"
        );
    }

    #[test]
    fn result_length_and_timestamps_continue_cadence() {
        let h = wiggly(60);
        let result = compute_forecast(&h, 12, 0.95).expect("forecast should succeed");
        assert_eq!(result.len(), 12);
        let last = h[h.len() - 1].timestamp;
        for (k, p) in result.points.iter().enumerate() {
            assert_eq!(p.timestamp, last + TimeDelta::minutes(5 * (k as i64 + 1)));
        }
        assert_eq!(result.span(), TimeDelta::hours(1));
    }

    #[test]
    fn bounds_bracket_point_forecast() {
        let result = compute_forecast(&wiggly(80), 36, 0.95).expect("forecast should succeed");
        for p in &result.points {
            assert!(p.lower <= p.forecast && p.forecast <= p.upper, "{p}");
        }
    }

    #[test]
    fn wider_level_gives_wider_bounds() {
        let h = wiggly(50);
        let narrow = compute_forecast(&h, 6, 0.80).expect("forecast should succeed");
        let wide = compute_forecast(&h, 6, 0.99).expect("forecast should succeed");
        for (n, w) in narrow.points.iter().zip(&wide.points) {
            assert!((n.forecast - w.forecast).abs() < 1e-12);
            assert!(w.upper - w.lower > n.upper - n.lower);
        }
    }

    #[test]
    fn forecast_is_deterministic() {
        let h = wiggly(50);
        let a = compute_forecast(&h, 10, 0.95).expect("forecast should succeed");
        let b = compute_forecast(&h, 10, 0.95).expect("forecast should succeed");
        assert_eq!(a, b);
    }

    #[test]
    fn peak_is_max_point_forecast() {
        let result = compute_forecast(&wiggly(50), 10, 0.95).expect("forecast should succeed");
        let peak = result.peak().expect("non-empty forecast");
        for p in &result.points {
            assert!(p.forecast <= peak.forecast);
        }
    }

    #[test]
    fn steps_from_minutes_floors_and_rejects_non_positive() {
        let five = TimeDelta::minutes(5);
        assert_eq!(steps_from_minutes(60, five).ok(), Some(12));
        assert_eq!(steps_from_minutes(62, five).ok(), Some(12));
        assert_eq!(steps_from_minutes(180, five).ok(), Some(36));
        assert!(matches!(
            steps_from_minutes(0, five),
            Err(ForecastError::InvalidHorizon(0))
        ));
        assert!(matches!(
            steps_from_minutes(-30, five),
            Err(ForecastError::InvalidHorizon(-30))
        ));
        assert!(matches!(
            steps_from_minutes(4, five),
            Err(ForecastError::InvalidHorizon(0))
        ));
    }

    #[test]
    fn horizon_from_steps_and_minutes() {
        let five = TimeDelta::minutes(5);
        assert!(matches!(Horizon::from_steps(0), Err(ForecastError::InvalidHorizon(0))));
        let h = Horizon::from_minutes(90, five).expect("valid horizon");
        assert_eq!(h.steps(), 18);
        assert_eq!(h.minutes(five), 90);
        assert_eq!(Horizon::from_steps(18).ok(), Some(h));
        assert!(Horizon::from_minutes(-5, five).is_err());
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let five = TimeDelta::minutes(5);
        assert_eq!(steps_from_minutes(24 * 60, five).ok(), Some(MAX_HORIZON_STEPS));
        assert!(matches!(
            steps_from_minutes(24 * 60 + 5, five),
            Err(ForecastError::InvalidHorizon(289))
        ));
        assert!(matches!(
            steps_from_minutes(i64::MAX, five),
            Err(ForecastError::InvalidHorizon(_))
        ));
        assert!(Horizon::from_steps(MAX_HORIZON_STEPS + 1).is_err());
        assert!(Horizon::from_minutes(100_000_000_000, five).is_err());
    }

    #[test]
    fn oversized_horizon_fails_before_fitting() {
        let err = compute_forecast(&history(&[1.0, 2.0]), usize::MAX, 0.95).err();
        assert!(matches!(err, Some(ForecastError::InvalidHorizon(_))), "{err:?}");
    }

    #[test]
    fn longest_horizon_is_accepted() {
        let result = compute_forecast(&wiggly(60), MAX_HORIZON_STEPS, 0.95)
            .expect("forecast should succeed");
        assert_eq!(result.len(), MAX_HORIZON_STEPS);
    }

    #[test]
    fn display_reports_drift() {
        let result = compute_forecast(&wiggly(40), 2, 0.95).expect("forecast should succeed");
        assert!(format!("{result}").contains("drift="));
    }

    #[test]
    fn display_lists_every_step() {
        let result = compute_forecast(&wiggly(40), 4, 0.95).expect("forecast should succeed");
        let text = format!("{result}");
        assert!(text.starts_with("--- Forecast: next 20 minutes (95% CI) ---"));
        assert_eq!(text.lines().count(), 2 + 4);
    }
}
