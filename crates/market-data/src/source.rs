use std::collections::{HashMap, HashSet};
use std::future::Future;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{MarketDataError, Result};
use crate::types::{HistoryRange, PriceBar, PriceHistory, Ticker};

/// Trading days served for [`HistoryRange::OneYear`] by sources that count bars.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Anything that can answer "daily closes for this ticker over this range".
pub trait PriceSource: Send + Sync {
    fn daily_history(
        &self,
        ticker: &Ticker,
        range: HistoryRange,
    ) -> impl Future<Output = Result<PriceHistory>> + Send;
}

/// Preloaded close series, one bar per day ending today.
#[derive(Debug, Default)]
pub struct InMemorySource {
    series: RwLock<HashMap<Ticker, Vec<PriceBar>>>,
    failing: RwLock<HashSet<Ticker>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(self, ticker: Ticker, closes: &[f64]) -> Self {
        self.set_closes(ticker, closes);
        self
    }

    pub fn set_closes(&self, ticker: Ticker, closes: &[f64]) {
        let today = Utc::now();
        let count = closes.len() as i64;
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar::new(today - Duration::days(count - 1 - i as i64), *close))
            .collect();
        self.series.write().insert(ticker, bars);
    }

    /// Appends a new latest close, shifting the series one day forward.
    pub fn push_close(&self, ticker: &Ticker, close: f64) {
        let mut series = self.series.write();
        let bars = series.entry(ticker.clone()).or_default();
        for bar in bars.iter_mut() {
            bar.timestamp -= Duration::days(1);
        }
        bars.push(PriceBar::new(Utc::now(), close));
    }

    /// Makes every later request for `ticker` fail with a 503.
    pub fn fail(&self, ticker: Ticker) {
        self.failing.write().insert(ticker);
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        let mut tickers: Vec<Ticker> = self.series.read().keys().cloned().collect();
        tickers.sort();
        tickers
    }

    fn lookup(&self, ticker: &Ticker, range: HistoryRange) -> Result<PriceHistory> {
        if self.failing.read().contains(ticker) {
            return Err(MarketDataError::Status {
                status: 503,
                body: format!("{} is unavailable", ticker),
            });
        }

        let series = self.series.read();
        let bars = series.get(ticker).ok_or_else(|| MarketDataError::NoData {
            ticker: ticker.to_string(),
        })?;

        let wanted = match range {
            HistoryRange::Days(days) => days as usize,
            HistoryRange::OneYear => TRADING_DAYS_PER_YEAR,
            HistoryRange::LatestDay => 1,
        };

        let history = PriceHistory::new(ticker.clone(), bars.clone()).tail(wanted);
        debug!("In-memory source served {} bars for {} ({})", history.len(), ticker, range);
        Ok(history)
    }
}

impl PriceSource for InMemorySource {
    async fn daily_history(&self, ticker: &Ticker, range: HistoryRange) -> Result<PriceHistory> {
        self.lookup(ticker, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).unwrap()
    }

    #[tokio::test]
    async fn test_serves_requested_tail() {
        let closes: Vec<f64> = (0..400).map(|i| 100.0 + i as f64).collect();
        let source = InMemorySource::new().with_closes(ticker("AAPL"), &closes);

        let recent = source.daily_history(&ticker("AAPL"), HistoryRange::Days(90)).await.unwrap();
        assert_eq!(recent.len(), 90);
        assert_eq!(recent.last_close(), Some(499.0));

        let year = source.daily_history(&ticker("AAPL"), HistoryRange::OneYear).await.unwrap();
        assert_eq!(year.len(), TRADING_DAYS_PER_YEAR);

        let latest = source.daily_history(&ticker("AAPL"), HistoryRange::LatestDay).await.unwrap();
        assert_eq!(latest.closes(), vec![499.0]);
    }

    #[tokio::test]
    async fn test_bars_are_daily_and_ordered() {
        let source = InMemorySource::new().with_closes(ticker("MSFT"), &[1.0, 2.0, 3.0]);
        let history = source.daily_history(&ticker("MSFT"), HistoryRange::Days(30)).await.unwrap();

        let gaps: Vec<i64> = history
            .bars
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_days())
            .collect();
        assert_eq!(gaps, vec![1, 1]);
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_no_data() {
        let source = InMemorySource::new();
        let result = source.daily_history(&ticker("ZZZZ"), HistoryRange::LatestDay).await;
        assert!(matches!(result, Err(MarketDataError::NoData { .. })));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let source = InMemorySource::new()
            .with_closes(ticker("TSLA"), &[200.0])
            .with_closes(ticker("KO"), &[60.0]);
        source.fail(ticker("TSLA"));

        let result = source.daily_history(&ticker("TSLA"), HistoryRange::LatestDay).await;
        assert!(matches!(result, Err(MarketDataError::Status { status: 503, .. })));
        assert!(source.daily_history(&ticker("KO"), HistoryRange::LatestDay).await.is_ok());
    }

    #[tokio::test]
    async fn test_push_close_moves_latest_price() {
        let source = InMemorySource::new().with_closes(ticker("AMD"), &[100.0, 101.0]);
        source.push_close(&ticker("AMD"), 120.0);

        let history = source.daily_history(&ticker("AMD"), HistoryRange::Days(30)).await.unwrap();
        assert_eq!(history.closes(), vec![100.0, 101.0, 120.0]);
        assert_eq!(source.tickers(), vec![ticker("AMD")]);
    }
}
