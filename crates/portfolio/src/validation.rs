use market_data::Ticker;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum TradeError {
    #[error("Trade amount must be a positive number, got {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Trade amount {amount:.2} is outside the allowed range {min:.2}..={max:.2}")]
    AmountOutOfRange { amount: f64, min: f64, max: f64 },

    #[error("Share price must be a positive number, got {price}")]
    InvalidPrice { price: f64 },

    #[error("Insufficient funds")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("No shares to sell")]
    NoShares { ticker: Ticker },

    #[error("Not enough shares to sell")]
    InsufficientShares { requested: f64, owned: f64 },
}

/// Per-trade dollar bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeLimits {
    pub min_amount: f64,
    pub max_amount: f64,
}

impl Default for TradeLimits {
    fn default() -> Self {
        Self {
            min_amount: 10.0,
            max_amount: 1_000.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TradeValidator {
    limits: TradeLimits,
}

impl TradeValidator {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_limits(limits: TradeLimits) -> Self {
        Self { limits }
    }

    /// Checks the request itself; balance and holdings are checked by the account.
    pub fn validate(&self, amount: f64, price: f64) -> Result<(), TradeError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TradeError::InvalidAmount { amount });
        }

        if amount < self.limits.min_amount || amount > self.limits.max_amount {
            return Err(TradeError::AmountOutOfRange {
                amount,
                min: self.limits.min_amount,
                max: self.limits.max_amount,
            });
        }

        if !price.is_finite() || price <= 0.0 {
            return Err(TradeError::InvalidPrice { price });
        }

        Ok(())
    }

    pub fn validate_purchase(&self, amount: f64, balance: f64) -> Result<(), TradeError> {
        if amount > balance {
            return Err(TradeError::InsufficientFunds {
                required: amount,
                available: balance,
            });
        }
        Ok(())
    }

    pub fn validate_sale(&self, ticker: &Ticker, shares: f64, owned: f64) -> Result<(), TradeError> {
        if owned <= 0.0 {
            return Err(TradeError::NoShares { ticker: ticker.clone() });
        }
        if shares > owned {
            return Err(TradeError::InsufficientShares {
                requested: shares,
                owned,
            });
        }
        Ok(())
    }
}
