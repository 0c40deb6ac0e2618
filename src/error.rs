//! Error types for input parsing, model fitting, and forecasting.
//!
//! The three families are kept apart because their remedies differ: an
//! [`InputError`] means the file must be fixed, a [`FitError`] usually means
//! more (or more varied) history is needed, and an invalid horizon is a
//! caller mistake.

use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

/// Malformed tabular input or history shape.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing required column \"{0}\"")]
    MissingColumn(&'static str),

    #[error("row {row}: malformed timestamp \"{value}\"")]
    MalformedTimestamp { row: usize, value: String },

    #[error("row {row}: column \"{column}\" is not a valid value: \"{value}\"")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: timestamp {timestamp} does not follow {previous}")]
    NonMonotonic {
        row: usize,
        previous: NaiveDateTime,
        timestamp: NaiveDateTime,
    },

    #[error("row {row}: expected a {expected_minutes}-minute step, found {actual_minutes} minutes")]
    IrregularCadence {
        row: usize,
        expected_minutes: i64,
        actual_minutes: i64,
    },

    #[error("no data rows")]
    Empty,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InputError {
    pub(crate) fn irregular(row: usize, expected: TimeDelta, actual: TimeDelta) -> Self {
        Self::IrregularCadence {
            row,
            expected_minutes: expected.num_minutes(),
            actual_minutes: actual.num_minutes(),
        }
    }
}

/// The ARIMA fit could not produce a trustworthy model.
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("insufficient history: need at least {required} observations, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("series is (near) constant after differencing; the model is not identifiable")]
    DegenerateSeries,

    #[error("model estimation failed: {0}")]
    Estimation(String),

    #[error("fit produced a non-finite {0}")]
    NonFinite(&'static str),
}

/// Failure of a single fit-and-forecast call.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(
        "forecast horizon out of range: {0} (allowed: 1 to {max} steps)",
        max = crate::forecast::MAX_HORIZON_STEPS
    )]
    InvalidHorizon(i64),

    #[error("confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),

    #[error("history is not a valid series: {0}")]
    History(#[from] InputError),

    #[error("model fit failed: {0}")]
    Fit(#[from] FitError),
}
