//! Predicted-peak callout and high-load advisory.

use std::fmt;

use chrono::NaiveDateTime;

use super::ForecastResult;
use crate::sim::types::TIMESTAMP_FORMAT;

/// Default peak threshold (kW) above which the advisory fires.
pub const DEFAULT_PEAK_THRESHOLD_KW: f64 = 8.0;

/// Advisory text shown when the predicted peak exceeds the threshold.
pub const HIGH_LOAD_WARNING: &str = "High electricity load expected. Energy optimization recommended.";

/// Highest point forecast over a horizon, checked against a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakAdvisory {
    /// When the peak is forecast to occur.
    pub at: NaiveDateTime,
    /// Peak point forecast (kW).
    pub peak_kw: f64,
    /// Threshold the peak was compared against (kW).
    pub threshold_kw: f64,
    /// Forecast horizon in minutes.
    pub horizon_minutes: i64,
    /// `true` iff `peak_kw > threshold_kw`.
    pub exceeds: bool,
}

impl PeakAdvisory {
    /// Assesses a forecast; `None` only for an empty result.
    pub fn assess(result: &ForecastResult, threshold_kw: f64) -> Option<Self> {
        let peak = result.peak()?;
        let advisory = Self {
            at: peak.timestamp,
            peak_kw: peak.forecast,
            threshold_kw,
            horizon_minutes: result.span().num_minutes(),
            exceeds: peak.forecast > threshold_kw,
        };
        if advisory.exceeds {
            tracing::warn!(
                peak_kw = advisory.peak_kw,
                threshold_kw,
                at = %advisory.at,
                "predicted peak above threshold"
            );
        }
        Some(advisory)
    }

    /// The warning line, if the threshold is exceeded.
    pub fn warning(&self) -> Option<&'static str> {
        self.exceeds.then_some(HIGH_LOAD_WARNING)
    }
}

impl fmt::Display for PeakAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Predicted peak load in next {} minutes: {:.2} kW at {}",
            self.horizon_minutes,
            self.peak_kw,
            self.at.format(TIMESTAMP_FORMAT)
        )?;
        if let Some(warning) = self.warning() {
            write!(f, "\nWARNING: {warning}")?;
        }
        Ok(())
    }
}
