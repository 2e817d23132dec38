//! Metrics collection and monitoring

use metrics::{counter, histogram};
use portfolio::Side;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Default)]
pub struct SessionMetrics {
    trades_executed: AtomicU64,
    trades_rejected: AtomicU64,
    price_fetches: AtomicU64,
    fetch_failures: AtomicU64,
    forecasts: AtomicU64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trade(&self, side: Side, amount: f64) {
        self.trades_executed.fetch_add(1, Ordering::Relaxed);
        counter!("trades_executed_total", "side" => side.to_string()).increment(1);
        histogram!("trade_amount_usd").record(amount);
    }

    pub fn record_rejection(&self, side: Side) {
        self.trades_rejected.fetch_add(1, Ordering::Relaxed);
        counter!("trades_rejected_total", "side" => side.to_string()).increment(1);
    }

    pub fn record_fetch(&self, succeeded: bool, duration_ms: f64) {
        self.price_fetches.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.fetch_failures.fetch_add(1, Ordering::Relaxed);
            counter!("price_fetch_failures_total").increment(1);
        }
        histogram!("price_fetch_latency_ms").record(duration_ms);
    }

    pub fn record_forecast(&self) {
        self.forecasts.fetch_add(1, Ordering::Relaxed);
        counter!("forecasts_total").increment(1);
    }

    pub fn trades_executed(&self) -> u64 {
        self.trades_executed.load(Ordering::Relaxed)
    }

    pub fn trades_rejected(&self) -> u64 {
        self.trades_rejected.load(Ordering::Relaxed)
    }

    pub fn price_fetches(&self) -> u64 {
        self.price_fetches.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn forecasts(&self) -> u64 {
        self.forecasts.load(Ordering::Relaxed)
    }
}

/// Times one price fetch and reports it on [`finish`](FetchTimer::finish).
pub struct FetchTimer {
    start: Instant,
}

impl FetchTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn finish(self, metrics: &SessionMetrics, succeeded: bool) {
        let duration_ms = self.start.elapsed().as_secs_f64() * 1_000.0;
        metrics.record_fetch(succeeded, duration_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_without_recorder() {
        let metrics = SessionMetrics::new();
        metrics.record_trade(Side::Buy, 100.0);
        metrics.record_rejection(Side::Sell);
        metrics.record_forecast();

        FetchTimer::start().finish(&metrics, true);
        FetchTimer::start().finish(&metrics, false);

        assert_eq!(metrics.trades_executed(), 1);
        assert_eq!(metrics.trades_rejected(), 1);
        assert_eq!(metrics.forecasts(), 1);
        assert_eq!(metrics.price_fetches(), 2);
        assert_eq!(metrics.fetch_failures(), 1);
    }
}
