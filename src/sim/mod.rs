/// Fixed-cadence timestamp clock.
pub mod clock;
/// Bimodal classroom occupancy simulator.
pub mod occupancy;
pub mod types;
