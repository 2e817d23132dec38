use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Not enough data")]
    NotEnoughData { required: usize, actual: usize },

    #[error("Closing price at index {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("Cannot fit a trend through {observations} observation(s)")]
    Degenerate { observations: usize },

    #[error("Invalid forecast configuration: {reason}")]
    InvalidConfig { reason: String },
}
