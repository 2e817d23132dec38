//! Naive trend forecasting: fit a straight line through a year of daily
//! closes against the day index and extrapolate it a few days forward.

pub mod error;
pub mod regression;
pub mod trend;

pub use error::ForecastError;
pub use regression::LinearFit;
pub use trend::*;

pub type Result<T> = std::result::Result<T, ForecastError>;
