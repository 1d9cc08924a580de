//! Historical series provider: CSV files and synthetic generation.

pub mod csv_series;
pub mod synthetic;

pub use csv_series::{load_csv, save_csv, DataError, LoadedSeries};
pub use synthetic::{generate, Trend};
