//! Fixed-order ARIMA(1,1,1) fitting and projection.
//!
//! Estimation and interval arithmetic are delegated to `anofox_forecast`.
//! Its ARIMA fits the differenced series by conditional least squares with
//! an intercept (the mean step, i.e. a drift on the load scale), bounded AR
//! and MA coefficients, and intervals that widen with `sigma2 * h`.
//!
//! This module only guards the inputs the library accepts silently and
//! turns its results and errors into this crate's types. The order is
//! fixed; no alternative orders are tried when a fit fails.

use anofox_forecast::core::TimeSeries;
use anofox_forecast::error::ForecastError as ModelError;
use anofox_forecast::models::Forecaster;
use anofox_forecast::models::arima::ARIMA;

use crate::error::FitError;
use crate::sim::types::LoadSample;

/// Model order `(p, d, q)`.
pub const ORDER: (usize, usize, usize) = (1, 1, 1);

/// Minimum observations required to fit: `p + d + q + 1`.
pub const MIN_OBSERVATIONS: usize = ORDER.0 + ORDER.1 + ORDER.2 + 1;

/// Differences smaller than this everywhere make the series degenerate.
const DEGENERATE_EPS: f64 = 1e-9;

impl From<ModelError> for FitError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InsufficientData { needed, got, .. } => Self::InsufficientHistory {
                required: needed,
                actual: got,
            },
            other => Self::Estimation(other.to_string()),
        }
    }
}

/// Point forecasts with two-sided bounds, one entry per step.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// `(forecast, lower, upper)` per step.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.point
            .iter()
            .zip(&self.lower)
            .zip(&self.upper)
            .map(|((&p, &l), &u)| (p, l, u))
    }
}

/// A fitted ARIMA(1,1,1) model.
///
/// Built and consumed within a single forecast call.
#[derive(Debug, Clone)]
pub struct Arima111 {
    model: ARIMA,
    /// Autoregressive coefficient.
    pub phi: f64,
    /// Moving-average coefficient.
    pub theta: f64,
    /// Mean step of the differenced series (kW per interval).
    pub intercept: f64,
    /// Innovation variance: mean squared one-step residual.
    pub sigma2: f64,
    /// Akaike information criterion, when the library reports one.
    pub aic: Option<f64>,
    /// Number of observations the model was fitted on.
    pub observations: usize,
}

impl Arima111 {
    /// Fits the model to the load values of `history`.
    ///
    /// # Errors
    ///
    /// * [`FitError::InsufficientHistory`] - fewer than [`MIN_OBSERVATIONS`] points
    /// * [`FitError::NonFinite`] - a non-finite observation, estimate, or variance
    /// * [`FitError::DegenerateSeries`] - the differenced series is (near) zero
    ///   or leaves no residual variance
    /// * [`FitError::Estimation`] - any other failure reported by the library
    pub fn fit(history: &[LoadSample]) -> Result<Self, FitError> {
        if history.len() < MIN_OBSERVATIONS {
            return Err(FitError::InsufficientHistory {
                required: MIN_OBSERVATIONS,
                actual: history.len(),
            });
        }
        if history.iter().any(|s| !s.electricity_kw.is_finite()) {
            return Err(FitError::NonFinite("observation"));
        }
        if history
            .windows(2)
            .all(|w| (w[1].electricity_kw - w[0].electricity_kw).abs() < DEGENERATE_EPS)
        {
            return Err(FitError::DegenerateSeries);
        }

        let timestamps = history.iter().map(|s| s.timestamp.and_utc()).collect();
        let values = history.iter().map(|s| s.electricity_kw).collect();
        let series = TimeSeries::univariate(timestamps, values)?;

        let mut model = ARIMA::arima_111();
        model.fit(&series)?;

        let phi = model.ar_coefficients().first().copied().unwrap_or(0.0);
        let theta = model.ma_coefficients().first().copied().unwrap_or(0.0);
        let intercept = model.intercept();
        if !(phi.is_finite() && theta.is_finite() && intercept.is_finite()) {
            return Err(FitError::NonFinite("coefficient"));
        }

        // the first residual has no lagged term and is not an estimate
        let residuals = model
            .residuals()
            .and_then(|r| r.get(ORDER.0.max(ORDER.2)..))
            .unwrap_or(&[]);
        if residuals.is_empty() {
            return Err(FitError::Estimation("no residuals after fit".to_string()));
        }
        let sigma2 = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
        if !sigma2.is_finite() {
            return Err(FitError::NonFinite("innovation variance"));
        }
        if sigma2 <= 0.0 {
            return Err(FitError::DegenerateSeries);
        }

        tracing::debug!(phi, theta, intercept, sigma2, "fitted ARIMA(1,1,1)");

        Ok(Self {
            aic: model.aic(),
            model,
            phi,
            theta,
            intercept,
            sigma2,
            observations: history.len(),
        })
    }

    /// Forecasts `steps` observations ahead with bounds at `level`.
    ///
    /// # Errors
    ///
    /// * [`FitError::NonFinite`] - a forecast or bound is not finite
    /// * [`FitError::Estimation`] - the library failed or returned the wrong length
    pub fn forecast(&self, steps: usize, level: f64) -> Result<Projection, FitError> {
        let forecast = self.model.predict_with_intervals(steps, level)?;
        let point = forecast.primary().to_vec();
        let lower = forecast.lower_series(0).map(|s| s.to_vec()).unwrap_or_default();
        let upper = forecast.upper_series(0).map(|s| s.to_vec()).unwrap_or_default();

        if point.len() != steps || lower.len() != steps || upper.len() != steps {
            return Err(FitError::Estimation(format!(
                "expected {steps} forecast steps, got {} (bounds {}/{})",
                point.len(),
                lower.len(),
                upper.len()
            )));
        }
        if point.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite("forecast"));
        }
        if lower.iter().chain(&upper).any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite("confidence bound"));
        }

        Ok(Projection { point, lower, upper })
    }
}
