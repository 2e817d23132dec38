use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::MarketDataError;

/// Upper-cased stock symbol, e.g. `AAPL` or `BRK-B`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, MarketDataError> {
        let symbol = input.trim().to_uppercase();

        if symbol.is_empty() {
            return Err(MarketDataError::InvalidTicker {
                input: input.to_string(),
                reason: "symbol is empty".to_string(),
            });
        }

        if let Some(bad) = symbol.chars().find(|c| !Self::is_symbol_char(*c)) {
            return Err(MarketDataError::InvalidTicker {
                input: input.to_string(),
                reason: format!("unexpected character '{}'", bad),
            });
        }

        Ok(Self(symbol))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    fn is_symbol_char(c: char) -> bool {
        c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '^' | '=')
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl std::str::FromStr for Ticker {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// How much daily history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryRange {
    Days(u32),
    OneYear,
    LatestDay,
}

impl HistoryRange {
    /// Range token understood by the chart endpoint.
    pub fn as_query(&self) -> String {
        match self {
            HistoryRange::Days(days) => format!("{}d", days),
            HistoryRange::OneYear => "1y".to_string(),
            HistoryRange::LatestDay => "1d".to_string(),
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PriceBar {
    #[inline]
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Daily closes for one ticker, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub ticker: Ticker,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    #[inline]
    pub fn new(ticker: Ticker, bars: Vec<PriceBar>) -> Self {
        Self { ticker, bars }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    #[inline]
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    pub fn min_close(&self) -> Option<f64> {
        self.bars.iter().map(|bar| bar.close).reduce(f64::min)
    }

    pub fn max_close(&self) -> Option<f64> {
        self.bars.iter().map(|bar| bar.close).reduce(f64::max)
    }

    /// Keeps only the most recent `count` bars.
    pub fn tail(&self, count: usize) -> Self {
        let start = self.bars.len().saturating_sub(count);
        Self {
            ticker: self.ticker.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }
}
