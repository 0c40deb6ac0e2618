//! CSV artifacts: occupancy and load in, occupancy, load and forecast out.

pub mod export;
pub mod import;

pub use export::{
    FORECAST_HEADER, LOAD_HEADER, OCCUPANCY_HEADER, export_forecast_csv, export_load_csv,
    export_occupancy_csv, write_forecast_csv, write_load_csv, write_occupancy_csv,
};
pub use import::{
    import_load_csv, import_occupancy_csv, read_forecast_csv, read_load_csv, read_occupancy_csv,
};
