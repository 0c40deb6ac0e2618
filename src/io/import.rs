//! CSV import with input-shape validation.
//!
//! Every reader checks the same contract before any derivation happens:
//! the required columns exist, each timestamp parses, each value parses,
//! and timestamps are strictly increasing at one fixed step.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};

use super::export::{FORECAST_HEADER, LOAD_HEADER, OCCUPANCY_HEADER};
use crate::error::InputError;
use crate::forecast::ForecastPoint;
use crate::sim::types::{LoadSample, OccupancySample, parse_timestamp};

/// Reads an occupancy CSV file.
///
/// `interval` fixes the expected step; with `None` the step between the
/// first two rows is used.
///
/// # Errors
///
/// Returns an [`InputError`] describing the first offending row.
pub fn import_occupancy_csv(
    path: &Path,
    interval: Option<TimeDelta>,
) -> Result<Vec<OccupancySample>, InputError> {
    read_occupancy_csv(File::open(path)?, interval)
}

/// Reads occupancy samples from any CSV source.
///
/// # Errors
///
/// Returns an [`InputError`] describing the first offending row.
pub fn read_occupancy_csv(
    reader: impl Read,
    interval: Option<TimeDelta>,
) -> Result<Vec<OccupancySample>, InputError> {
    let rows = read_series(reader, OCCUPANCY_HEADER[0], OCCUPANCY_HEADER[1], |raw| {
        raw.trim().parse::<u32>().ok()
    })?;
    check_cadence(&rows, interval)?;
    Ok(rows
        .into_iter()
        .map(|(timestamp, connected_devices)| OccupancySample {
            timestamp,
            connected_devices,
        })
        .collect())
}

/// Reads a load CSV file.
///
/// # Errors
///
/// Returns an [`InputError`] describing the first offending row.
pub fn import_load_csv(path: &Path, interval: Option<TimeDelta>) -> Result<Vec<LoadSample>, InputError> {
    read_load_csv(File::open(path)?, interval)
}

/// Reads load samples from any CSV source.
///
/// # Errors
///
/// Returns an [`InputError`] describing the first offending row.
pub fn read_load_csv(
    reader: impl Read,
    interval: Option<TimeDelta>,
) -> Result<Vec<LoadSample>, InputError> {
    let rows = read_series(reader, LOAD_HEADER[0], LOAD_HEADER[1], parse_finite)?;
    check_cadence(&rows, interval)?;
    Ok(rows
        .into_iter()
        .map(|(timestamp, electricity_kw)| LoadSample {
            timestamp,
            electricity_kw,
        })
        .collect())
}

/// Reads an exported forecast back in.
///
/// # Errors
///
/// Returns an [`InputError`] for missing columns or unparseable values.
pub fn read_forecast_csv(reader: impl Read) -> Result<Vec<ForecastPoint>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let [time, forecast, lower, upper] = FORECAST_HEADER.map(|name| column_index(&headers, name));
    let (time, forecast, lower, upper) = (time?, forecast?, lower?, upper?);

    let mut points = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let value = |idx: usize, column: &'static str| {
            let raw = record.get(idx).unwrap_or("");
            parse_finite(raw).ok_or_else(|| InputError::InvalidValue {
                row,
                column,
                value: raw.to_string(),
            })
        };
        points.push(ForecastPoint {
            timestamp: timestamp_at(&record, time, row)?,
            forecast: value(forecast, FORECAST_HEADER[1])?,
            lower: value(lower, FORECAST_HEADER[2])?,
            upper: value(upper, FORECAST_HEADER[3])?,
        });
    }
    Ok(points)
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn column_index(headers: &csv::StringRecord, name: &'static str) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(InputError::MissingColumn(name))
}

fn timestamp_at(record: &csv::StringRecord, idx: usize, row: usize) -> Result<NaiveDateTime, InputError> {
    let raw = record.get(idx).unwrap_or("");
    parse_timestamp(raw).ok_or_else(|| InputError::MalformedTimestamp {
        row,
        value: raw.to_string(),
    })
}

/// Reads `(timestamp, value)` pairs from two named columns.
fn read_series<T>(
    reader: impl Read,
    time_column: &'static str,
    value_column: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<(NaiveDateTime, T)>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let time_idx = column_index(&headers, time_column)?;
    let value_idx = column_index(&headers, value_column)?;

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let timestamp = timestamp_at(&record, time_idx, row)?;
        let raw = record.get(value_idx).unwrap_or("");
        let value = parse(raw).ok_or_else(|| InputError::InvalidValue {
            row,
            column: value_column,
            value: raw.to_string(),
        })?;
        rows.push((timestamp, value));
    }

    if rows.is_empty() {
        return Err(InputError::Empty);
    }
    tracing::debug!(rows = rows.len(), column = value_column, "read csv series");
    Ok(rows)
}

fn check_cadence<T>(rows: &[(NaiveDateTime, T)], interval: Option<TimeDelta>) -> Result<(), InputError> {
    check_timestamps(rows.iter().map(|(ts, _)| *ts), interval).map(|_| ())
}

/// Checks strictly increasing timestamps at a single fixed step.
///
/// With `interval` unset the first step fixes the cadence. Returns the
/// cadence found, or `None` for fewer than two timestamps. Row numbers in
/// errors are 1-based.
pub(crate) fn check_timestamps(
    timestamps: impl IntoIterator<Item = NaiveDateTime>,
    interval: Option<TimeDelta>,
) -> Result<Option<TimeDelta>, InputError> {
    let mut expected = interval;
    let mut previous: Option<NaiveDateTime> = None;
    for (i, timestamp) in timestamps.into_iter().enumerate() {
        let row = i + 1;
        if let Some(prev) = previous {
            let step = timestamp - prev;
            if step <= TimeDelta::zero() {
                return Err(InputError::NonMonotonic {
                    row,
                    previous: prev,
                    timestamp,
                });
            }
            match expected {
                Some(e) if e != step => return Err(InputError::irregular(row, e, step)),
                Some(_) => {}
                None => expected = Some(step),
            }
        }
        previous = Some(timestamp);
    }
    Ok(expected)
}
