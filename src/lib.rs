//! # stock-sim: Paper-Trading Stock Simulator
//!
//! A single-session simulator featuring:
//! - Daily price history from Yahoo Finance or an offline demo source
//! - A linear-trend 7-day price forecast
//! - Buying and selling fractional shares against a virtual cash balance
//! - An in-memory portfolio valued at the latest close

pub mod command;
pub mod config;
pub mod demo;
pub mod metrics;
pub mod render;
pub mod simulator;
pub mod utils;

pub use forecast;
pub use market_data;
pub use portfolio;

pub use config::{ConfigError, SimulatorConfig};
pub use simulator::{Controls, Dashboard, ForecastOutcome, Simulator, TradeAction};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
