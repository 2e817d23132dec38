use std::collections::HashMap;

use market_data::Ticker;
use serde::{Deserialize, Serialize};

use crate::account::Account;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValue {
    pub ticker: Ticker,
    pub shares: f64,
    pub price: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub rows: Vec<HoldingValue>,
    pub total_value: f64,
    pub net_worth: f64,
}

impl PortfolioValuation {
    /// True when nothing held could be valued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_value == 0.0
    }
}

impl Account {
    /// Marks every held ticker to `prices`. Tickers without a price are left out.
    pub fn valuate(&self, prices: &HashMap<Ticker, f64>) -> PortfolioValuation {
        let rows: Vec<HoldingValue> = self
            .holdings()
            .filter_map(|(ticker, shares)| {
                prices.get(ticker).map(|&price| HoldingValue {
                    ticker: ticker.clone(),
                    shares,
                    price,
                    value: shares * price,
                })
            })
            .collect();

        let total_value: f64 = rows.iter().map(|row| row.value).sum();

        PortfolioValuation {
            rows,
            total_value,
            net_worth: self.balance() + total_value,
        }
    }
}
