use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use market_data::Ticker;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::validation::{TradeError, TradeLimits, TradeValidator};

pub const DEFAULT_STARTING_BALANCE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A completed simulated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub id: Uuid,
    pub ticker: Ticker,
    pub side: Side,
    pub shares: f64,
    pub price: f64,
    pub amount: f64,
    pub balance_after: f64,
    pub timestamp: DateTime<Utc>,
}

/// Virtual cash plus holdings for one session.
#[derive(Debug, Clone)]
pub struct Account {
    balance: f64,
    /// Shares per ticker; sold-out tickers stay at zero.
    holdings: BTreeMap<Ticker, f64>,
    fills: Vec<Fill>,
    validator: TradeValidator,
}

impl Account {
    #[inline]
    pub fn new(starting_balance: f64) -> Self {
        Self::with_limits(starting_balance, TradeLimits::default())
    }

    pub fn with_limits(starting_balance: f64, limits: TradeLimits) -> Self {
        Self {
            balance: starting_balance,
            holdings: BTreeMap::new(),
            fills: Vec::new(),
            validator: TradeValidator::with_limits(limits),
        }
    }

    #[inline]
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Shares held in `ticker`, zero when never traded.
    #[inline]
    pub fn shares(&self, ticker: &Ticker) -> f64 {
        self.holdings.get(ticker).copied().unwrap_or(0.0)
    }

    /// Tickers with a positive share count, in symbol order.
    pub fn holdings(&self) -> impl Iterator<Item = (&Ticker, f64)> {
        self.holdings
            .iter()
            .filter(|(_, shares)| **shares > 0.0)
            .map(|(ticker, shares)| (ticker, *shares))
    }

    pub fn held_tickers(&self) -> Vec<Ticker> {
        self.holdings().map(|(ticker, _)| ticker.clone()).collect()
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Spends `amount` dollars on `ticker` at `price`.
    pub fn buy(&mut self, ticker: &Ticker, amount: f64, price: f64) -> Result<Fill, TradeError> {
        self.validator.validate(amount, price)?;
        self.validator.validate_purchase(amount, self.balance)?;

        let shares = amount / price;
        *self.holdings.entry(ticker.clone()).or_insert(0.0) += shares;
        self.balance -= amount;

        Ok(self.record(ticker, Side::Buy, shares, price, amount))
    }

    /// Sells `amount` dollars' worth of `ticker` at `price`.
    pub fn sell(&mut self, ticker: &Ticker, amount: f64, price: f64) -> Result<Fill, TradeError> {
        self.validator.validate(amount, price)?;

        let owned = self.shares(ticker);
        let shares = amount / price;
        self.validator.validate_sale(ticker, shares, owned)?;

        if let Some(held) = self.holdings.get_mut(ticker) {
            *held -= shares;
        }
        self.balance += amount;

        Ok(self.record(ticker, Side::Sell, shares, price, amount))
    }

    fn record(&mut self, ticker: &Ticker, side: Side, shares: f64, price: f64, amount: f64) -> Fill {
        let fill = Fill {
            id: Uuid::new_v4(),
            ticker: ticker.clone(),
            side,
            shares,
            price,
            amount,
            balance_after: self.balance,
            timestamp: Utc::now(),
        };

        info!(
            "{} {:.4} shares of {} @ {:.2} for {:.2}, balance {:.2}",
            side, shares, ticker, price, amount, self.balance
        );

        self.fills.push(fill.clone());
        fill
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn aapl() -> Ticker {
        Ticker::parse("AAPL").unwrap()
    }

    #[test]
    fn test_buy_moves_cash_into_shares() {
        let mut account = Account::default();
        let fill = account.buy(&aapl(), 100.0, 200.0).unwrap();

        assert_eq!(fill.side, Side::Buy);
        assert_eq!(fill.shares, 0.5);
        assert_eq!(fill.balance_after, 9_900.0);
        assert_eq!(account.balance(), 9_900.0);
        assert_eq!(account.shares(&aapl()), 0.5);
        assert_eq!(account.held_tickers(), vec![aapl()]);
    }

    #[test]
    fn test_buy_with_insufficient_funds_changes_nothing() {
        let mut account = Account::new(50.0);
        let err = account.buy(&aapl(), 100.0, 10.0).unwrap_err();

        assert!(matches!(err, TradeError::InsufficientFunds { .. }));
        assert_eq!(account.balance(), 50.0);
        assert_eq!(account.shares(&aapl()), 0.0);
        assert!(account.fills().is_empty());
    }

    #[test]
    fn test_sell_without_shares() {
        let mut account = Account::default();
        assert!(matches!(account.sell(&aapl(), 100.0, 10.0), Err(TradeError::NoShares { .. })));

        // Selling out and trying again hits the same check.
        account.buy(&aapl(), 100.0, 10.0).unwrap();
        account.sell(&aapl(), 100.0, 10.0).unwrap();
        assert!(matches!(account.sell(&aapl(), 100.0, 10.0), Err(TradeError::NoShares { .. })));
        assert_eq!(account.balance(), 10_000.0);
    }

    #[test]
    fn test_sell_more_than_owned() {
        let mut account = Account::default();
        account.buy(&aapl(), 100.0, 100.0).unwrap();

        // Price halved: $100 is now two shares but only one is owned.
        let err = account.sell(&aapl(), 100.0, 50.0).unwrap_err();
        assert!(matches!(err, TradeError::InsufficientShares { .. }));
        assert_eq!(account.shares(&aapl()), 1.0);
        assert_eq!(account.balance(), 9_900.0);
    }

    #[test]
    fn test_round_trip_at_same_price() {
        let mut account = Account::default();
        account.buy(&aapl(), 100.0, 187.33).unwrap();
        let fill = account.sell(&aapl(), 100.0, 187.33).unwrap();

        assert_eq!(fill.side, Side::Sell);
        assert_eq!(account.balance(), 10_000.0);
        assert_eq!(account.shares(&aapl()), 0.0);
        // The sold-out ticker no longer counts as held.
        assert!(account.held_tickers().is_empty());
        assert_eq!(account.holdings().count(), 0);
        assert_eq!(account.fills().len(), 2);
    }

    #[test]
    fn test_sell_after_price_rise_credits_amount_only() {
        let mut account = Account::default();
        account.buy(&aapl(), 200.0, 100.0).unwrap();
        account.sell(&aapl(), 100.0, 200.0).unwrap();

        assert_eq!(account.balance(), 9_900.0);
        assert_eq!(account.shares(&aapl()), 1.5);
    }

    #[test]
    fn test_limits_are_enforced() {
        let mut account = Account::default();
        assert!(matches!(
            account.buy(&aapl(), 5_000.0, 10.0),
            Err(TradeError::AmountOutOfRange { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_cash_plus_cost_is_conserved(
            trades in prop::collection::vec((any::<bool>(), 10.0f64..1_000.0, 1.0f64..500.0), 1..50)
        ) {
            let mut account = Account::default();
            let ticker = aapl();
            let mut spent = 0.0;

            for (is_buy, amount, price) in trades {
                let result = if is_buy {
                    account.buy(&ticker, amount, price)
                } else {
                    account.sell(&ticker, amount, price)
                };
                if let Ok(fill) = result {
                    spent += match fill.side {
                        Side::Buy => fill.amount,
                        Side::Sell => -fill.amount,
                    };
                }
                prop_assert!(account.balance() >= 0.0);
                prop_assert!(account.shares(&ticker) >= 0.0);
            }

            prop_assert!((account.balance() + spent - DEFAULT_STARTING_BALANCE).abs() < 1e-6);
        }
    }
}
