//! Property-based tests over random trade sequences and user input
//!
//! These tests look for inputs that break the account books or the renderers

use proptest::prelude::*;

use market_data::Ticker;
use portfolio::{Account, TradeError};
use stock_sim::command::Command;
use stock_sim::utils::{format_currency, sparkline};

prop_compose! {
    fn valid_price()(price in 0.5f64..5_000.0) -> f64 {
        price
    }
}

prop_compose! {
    fn valid_amount()(amount in 10.0f64..=1_000.0) -> f64 {
        amount
    }
}

prop_compose! {
    fn random_trade()(is_buy in any::<bool>(), symbol in 0..3usize, amount in valid_amount(), price in valid_price())
        -> (bool, usize, f64, f64) {
        (is_buy, symbol, amount, price)
    }
}

const SYMBOLS: [&str; 3] = ["AAPL", "MSFT", "KO"];

proptest! {
    #[test]
    fn fuzz_trade_sequences_keep_books_consistent(trades in prop::collection::vec(random_trade(), 1..200)) {
        let tickers: Vec<Ticker> = SYMBOLS.iter().map(|s| Ticker::parse(s).unwrap()).collect();
        let mut account = Account::default();
        let mut spent = 0.0;
        let mut received = 0.0;

        for (is_buy, symbol, amount, price) in trades {
            let ticker = &tickers[symbol];
            let before = account.balance();
            let owned = account.shares(ticker);

            let result = if is_buy {
                account.buy(ticker, amount, price)
            } else {
                account.sell(ticker, amount, price)
            };

            match result {
                Ok(fill) => {
                    if is_buy {
                        spent += amount;
                        prop_assert!(amount <= before);
                    } else {
                        received += amount;
                        prop_assert!(fill.shares <= owned);
                    }
                }
                Err(TradeError::InsufficientFunds { .. }) => prop_assert!(is_buy && amount > before),
                Err(TradeError::NoShares { .. }) => prop_assert!(!is_buy && owned <= 0.0),
                Err(TradeError::InsufficientShares { .. }) => prop_assert!(!is_buy && amount / price > owned),
                Err(other) => prop_assert!(false, "unexpected rejection: {}", other),
            }

            prop_assert!(account.balance() >= 0.0);
            prop_assert!(account.shares(ticker) >= -1e-9);
        }

        let expected = 10_000.0 - spent + received;
        prop_assert!((account.balance() - expected).abs() < 1e-6);
    }

    #[test]
    fn fuzz_command_parser_never_panics(line in "\\PC{0,40}") {
        let _ = line.parse::<Command>();
    }

    #[test]
    fn fuzz_sparkline_width(values in prop::collection::vec(0.0f64..10_000.0, 0..500), width in 1usize..120) {
        let line = sparkline(&values, width);
        prop_assert_eq!(line.chars().count(), values.len().min(width));
    }

    #[test]
    fn fuzz_currency_format(value in -1e9f64..1e9) {
        let text = format_currency(value);
        prop_assert!(text.contains('$'));
        prop_assert!(text.ends_with(|c: char| c.is_ascii_digit()));
        let digits: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
        let parsed: f64 = digits.parse().unwrap();
        prop_assert!((parsed - value.abs()).abs() <= 0.005 + 1e-6);
    }
}
