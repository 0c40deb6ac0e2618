//! Occupancy-to-electricity load derivation.

use crate::sim::types::{LoadSample, OccupancySample};

/// Default always-on classroom load (kW).
pub const DEFAULT_BASE_LOAD_KW: f64 = 2.0;
/// Default load attributed to each connected device (kW).
pub const DEFAULT_POWER_PER_DEVICE_KW: f64 = 0.15;

/// Affine occupancy-to-load model.
///
/// `load = base_load_kw + connected_devices * power_per_device_kw`
///
/// Both constants are configured, never fitted.
///
/// # Examples
///
/// ```
/// use occupancy_forecast::load::LoadModel;
///
/// let model = LoadModel::default();
/// assert_eq!(model.load_kw(0), 2.0);
/// assert!((model.load_kw(40) - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadModel {
    /// Baseline consumption in kilowatts
    pub base_load_kw: f64,
    /// Incremental consumption per connected device in kilowatts
    pub power_per_device_kw: f64,
}

impl Default for LoadModel {
    fn default() -> Self {
        Self {
            base_load_kw: DEFAULT_BASE_LOAD_KW,
            power_per_device_kw: DEFAULT_POWER_PER_DEVICE_KW,
        }
    }
}

impl LoadModel {
    pub fn new(base_load_kw: f64, power_per_device_kw: f64) -> Self {
        Self {
            base_load_kw,
            power_per_device_kw,
        }
    }

    /// Load in kilowatts for a given device count.
    pub fn load_kw(&self, connected_devices: u32) -> f64 {
        self.base_load_kw + f64::from(connected_devices) * self.power_per_device_kw
    }

    /// Derives one load sample per occupancy sample, keeping timestamps.
    pub fn derive(&self, occupancy: &[OccupancySample]) -> Vec<LoadSample> {
        occupancy
            .iter()
            .map(|s| LoadSample {
                timestamp: s.timestamp,
                electricity_kw: self.load_kw(s.connected_devices),
            })
            .collect()
    }
}
