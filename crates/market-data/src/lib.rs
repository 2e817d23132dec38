//! Daily closing-price history for the stock simulator.
//!
//! [`PriceSource`] is the seam the simulator talks to; [`YahooClient`] serves
//! it over HTTP and [`InMemorySource`] serves preloaded series.

pub mod error;
pub mod source;
pub mod types;
pub mod yahoo;

pub use error::{MarketDataError, Result};
pub use source::{InMemorySource, PriceSource, TRADING_DAYS_PER_YEAR};
pub use types::*;
pub use yahoo::{YahooClient, YahooConfig};
