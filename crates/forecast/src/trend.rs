use market_data::{PriceHistory, Ticker};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::ForecastError;
use crate::regression::LinearFit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Histories shorter than this are refused.
    pub min_observations: usize,
    /// Days predicted past the last observation; the last one is reported.
    pub horizon_days: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_observations: 30,
            horizon_days: 7,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidConfig {
                reason: "horizon_days must be at least 1".to_string(),
            });
        }
        if self.min_observations < 2 {
            return Err(ForecastError::InvalidConfig {
                reason: "min_observations must be at least 2".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outlook {
    Growth,
    Decline,
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outlook::Growth => write!(f, "Potential Growth"),
            Outlook::Decline => write!(f, "Possible Decline"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub ticker: Ticker,
    /// Price predicted for the last day of the horizon.
    pub value: f64,
    /// Every predicted day, first to last.
    pub path: Vec<f64>,
    pub fit: LinearFit,
    pub last_close: f64,
}

impl Forecast {
    /// Growth only when the forecast is strictly above `current_price`.
    #[inline]
    pub fn outlook(&self, current_price: f64) -> Outlook {
        if self.value > current_price {
            Outlook::Growth
        } else {
            Outlook::Decline
        }
    }

    pub fn expected_change_pct(&self, current_price: f64) -> f64 {
        (self.value - current_price) / current_price * 100.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrendForecaster {
    config: ForecastConfig,
}

impl TrendForecaster {
    pub fn new(config: ForecastConfig) -> Result<Self, ForecastError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn forecast(&self, history: &PriceHistory) -> Result<Forecast, ForecastError> {
        let closes = history.closes();
        let n = closes.len();

        if n < self.config.min_observations {
            return Err(ForecastError::NotEnoughData {
                required: self.config.min_observations,
                actual: n,
            });
        }

        let fit = LinearFit::fit(&closes)?;
        // Day indices n, n+1, ..., n+horizon-1.
        let path = fit.predict_range(n, self.config.horizon_days);
        let value = path.last().copied().unwrap_or_else(|| fit.predict(n as f64));
        let last_close = closes[n - 1];

        debug!(
            "Trend for {}: slope={:.4}/day intercept={:.2} r2={:.3} over {} closes -> {:.2}",
            history.ticker, fit.slope, fit.intercept, fit.r_squared, n, value
        );

        Ok(Forecast {
            ticker: history.ticker.clone(),
            value,
            path,
            fit,
            last_close,
        })
    }
}
