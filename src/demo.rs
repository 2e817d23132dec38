//! Synthetic price series for running without network access.

use market_data::{InMemorySource, Ticker};

const DEMO_DAYS: usize = 400;

/// (symbol, starting close, drift per day, swing amplitude, swing period in days)
const DEMO_SERIES: [(&str, f64, f64, f64, f64); 5] = [
    ("AAPL", 165.0, 0.08, 6.0, 37.0),
    ("MSFT", 330.0, 0.22, 9.0, 53.0),
    ("NVDA", 420.0, 0.95, 25.0, 29.0),
    ("TSLA", 260.0, -0.18, 18.0, 41.0),
    ("KO", 59.0, 0.0, 1.5, 61.0),
];

/// Deterministic close series: linear drift plus two overlapping swings.
pub fn demo_closes(start: f64, drift: f64, amplitude: f64, period: f64, days: usize) -> Vec<f64> {
    (0..days)
        .map(|day| {
            let t = day as f64;
            let swing = amplitude * (t * std::f64::consts::TAU / period).sin();
            let ripple = amplitude * 0.3 * (t * std::f64::consts::TAU / 7.0).cos();
            (start + drift * t + swing + ripple).max(1.0)
        })
        .collect()
}

pub fn demo_source() -> InMemorySource {
    let source = InMemorySource::new();
    for (symbol, start, drift, amplitude, period) in DEMO_SERIES {
        if let Ok(ticker) = Ticker::parse(symbol) {
            source.set_closes(ticker, &demo_closes(start, drift, amplitude, period, DEMO_DAYS));
        }
    }
    source
}
