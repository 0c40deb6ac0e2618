//! Classroom occupancy simulation and short-horizon electricity load forecasting.

pub mod config;
pub mod dataset;
pub mod error;
pub mod forecast;
pub mod io;
pub mod load;
/// Occupancy simulation, clock, and shared sample types.
pub mod sim;
#[cfg(feature = "tui")]
pub mod tui;
