//! CSV export for occupancy, load, and forecast series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::forecast::ForecastPoint;
use crate::sim::types::{LoadSample, OccupancySample, TIMESTAMP_FORMAT};

/// Occupancy CSV header.
pub const OCCUPANCY_HEADER: [&str; 2] = ["timestamp", "connected_devices"];
/// Load CSV header.
pub const LOAD_HEADER: [&str; 2] = ["timestamp", "electricity_kW"];
/// Forecast CSV header: time, point forecast, lower bound, upper bound.
pub const FORECAST_HEADER: [&str; 4] = ["Time", "Forecast (kW)", "Lower CI", "Upper CI"];

fn create(path: &Path) -> io::Result<io::BufWriter<File>> {
    Ok(io::BufWriter::new(File::create(path)?))
}

/// Exports occupancy samples to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_occupancy_csv(samples: &[OccupancySample], path: &Path) -> io::Result<()> {
    write_occupancy_csv(samples, create(path)?)
}

/// Writes occupancy samples as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_occupancy_csv(samples: &[OccupancySample], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(OCCUPANCY_HEADER)?;
    for s in samples {
        wtr.write_record(&[
            s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            s.connected_devices.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports load samples to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_load_csv(samples: &[LoadSample], path: &Path) -> io::Result<()> {
    write_load_csv(samples, create(path)?)
}

/// Writes load samples as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_load_csv(samples: &[LoadSample], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(LOAD_HEADER)?;
    for s in samples {
        wtr.write_record(&[
            s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", s.electricity_kw),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports forecast points to a CSV file at the given path.
///
/// Writes a header row followed by one row per forecast step. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_forecast_csv(points: &[ForecastPoint], path: &Path) -> io::Result<()> {
    write_forecast_csv(points, create(path)?)
}

/// Writes forecast points as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_forecast_csv(points: &[ForecastPoint], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(FORECAST_HEADER)?;
    for p in points {
        wtr.write_record(&[
            p.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.6}", p.forecast),
            format!("{:.6}", p.lower),
            format!("{:.6}", p.upper),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
