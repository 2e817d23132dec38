//! One user's simulation session: controls, account and the per-refresh flow.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use forecast::{Forecast, ForecastError, TrendForecaster};
use futures::future::join_all;
use market_data::{HistoryRange, MarketDataError, PriceHistory, PriceSource, Ticker};
use parking_lot::RwLock;
use portfolio::{Account, Fill, PortfolioValuation, Side, TradeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ControlsConfig, SimulatorConfig};
use crate::metrics::{FetchTimer, SessionMetrics};

pub type SharedAccount = Arc<RwLock<Account>>;

/// Sidebar state: what to look at and how much each trade moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub ticker: Ticker,
    pub history_days: u32,
    pub investment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl From<TradeAction> for Side {
    fn from(action: TradeAction) -> Self {
        match action {
            TradeAction::Buy => Side::Buy,
            TradeAction::Sell => Side::Sell,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketView {
    pub history: PriceHistory,
    pub current_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Prediction(Forecast),
    /// Shown as a warning in place of the forecast.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub valuation: PortfolioValuation,
    /// Held tickers whose latest price could not be loaded, with the reason.
    pub errors: Vec<(Ticker, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketPanel {
    pub view: MarketView,
    pub forecast: ForecastOutcome,
    pub trade: Option<Result<Fill, TradeError>>,
    pub portfolio: PortfolioReport,
}

/// Everything one refresh produced, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub controls: Controls,
    pub balance: f64,
    /// `Err` carries the message shown instead of the market panel.
    pub market: Result<MarketPanel, String>,
}

pub struct Simulator<S: PriceSource> {
    source: S,
    forecaster: TrendForecaster,
    account: SharedAccount,
    controls: Controls,
    bounds: ControlsConfig,
    metrics: Arc<SessionMetrics>,
}

impl<S: PriceSource> Simulator<S> {
    pub fn new(source: S, config: &SimulatorConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let bounds = config.controls.clone();
        let controls = Controls {
            ticker: Ticker::parse(&bounds.default_ticker)?,
            history_days: bounds.default_history_days,
            investment: bounds.default_investment,
        };
        let account = Account::with_limits(config.account.starting_balance, bounds.trade_limits.clone());

        Ok(Self {
            source,
            forecaster: TrendForecaster::new(config.forecast.clone())?,
            account: Arc::new(RwLock::new(account)),
            controls,
            bounds,
            metrics: Arc::new(SessionMetrics::new()),
        })
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn account(&self) -> SharedAccount {
        Arc::clone(&self.account)
    }

    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn balance(&self) -> f64 {
        self.account.read().balance()
    }

    pub fn set_ticker(&mut self, input: &str) -> anyhow::Result<()> {
        self.controls.ticker = Ticker::parse(input)?;
        debug!("Ticker set to {}", self.controls.ticker);
        Ok(())
    }

    pub fn set_history_days(&mut self, days: u32) -> anyhow::Result<()> {
        let (min, max) = (self.bounds.min_history_days, self.bounds.max_history_days);
        if !(min..=max).contains(&days) {
            bail!("History must be between {} and {} days", min, max);
        }
        self.controls.history_days = days;
        Ok(())
    }

    pub fn set_investment(&mut self, amount: f64) -> anyhow::Result<()> {
        let limits = &self.bounds.trade_limits;
        if !amount.is_finite() || amount < limits.min_amount || amount > limits.max_amount {
            bail!(
                "Investment amount must be between {} and {}",
                limits.min_amount,
                limits.max_amount
            );
        }
        self.controls.investment = amount;
        Ok(())
    }

    async fn fetch(&self, ticker: &Ticker, range: HistoryRange) -> market_data::Result<PriceHistory> {
        let timer = FetchTimer::start();
        let result = self.source.daily_history(ticker, range).await;
        timer.finish(&self.metrics, result.is_ok());
        result
    }

    /// Price history for the selected ticker and window.
    pub async fn market_view(&self) -> anyhow::Result<MarketView> {
        let ticker = &self.controls.ticker;
        let history = self
            .fetch(ticker, HistoryRange::Days(self.controls.history_days))
            .await
            .with_context(|| format!("loading {} price history", ticker))?;

        let current_price = history
            .last_close()
            .ok_or_else(|| anyhow!("No data returned for this symbol"))?;

        Ok(MarketView {
            history,
            current_price,
        })
    }

    /// Trend forecast over one year of closes; failures become a message.
    pub async fn forecast(&self) -> ForecastOutcome {
        let ticker = &self.controls.ticker;
        self.metrics.record_forecast();

        let history = match self.fetch(ticker, HistoryRange::OneYear).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Forecast history for {} unavailable: {}", ticker, e);
                return ForecastOutcome::Unavailable(format!("Prediction error: {}", e));
            }
        };

        match self.forecaster.forecast(&history) {
            Ok(forecast) => {
                info!("{} {}-day forecast: {:.2}", ticker, self.forecaster.config().horizon_days, forecast.value);
                ForecastOutcome::Prediction(forecast)
            }
            Err(e @ ForecastError::NotEnoughData { .. }) => ForecastOutcome::Unavailable(e.to_string()),
            Err(e) => ForecastOutcome::Unavailable(format!("Prediction error: {}", e)),
        }
    }

    /// Buys the configured investment of the selected ticker at `current_price`.
    pub fn buy(&self, current_price: f64) -> Result<Fill, TradeError> {
        self.trade(TradeAction::Buy, current_price)
    }

    /// Sells the configured investment of the selected ticker at `current_price`.
    pub fn sell(&self, current_price: f64) -> Result<Fill, TradeError> {
        self.trade(TradeAction::Sell, current_price)
    }

    pub fn trade(&self, action: TradeAction, current_price: f64) -> Result<Fill, TradeError> {
        let ticker = &self.controls.ticker;
        let amount = self.controls.investment;

        let result = {
            let mut account = self.account.write();
            match action {
                TradeAction::Buy => account.buy(ticker, amount, current_price),
                TradeAction::Sell => account.sell(ticker, amount, current_price),
            }
        };

        match &result {
            Ok(fill) => self.metrics.record_trade(fill.side, fill.amount),
            Err(e) => {
                warn!("{} {} rejected: {}", Side::from(action), ticker, e);
                self.metrics.record_rejection(action.into());
            }
        }
        result
    }

    /// Marks every held ticker to its latest close.
    pub async fn portfolio_report(&self) -> PortfolioReport {
        let held = self.account.read().held_tickers();

        let fetches = held.iter().map(|ticker| self.fetch(ticker, HistoryRange::LatestDay));
        let results = join_all(fetches).await;

        let mut prices = HashMap::new();
        let mut errors = Vec::new();
        for (ticker, result) in held.into_iter().zip(results) {
            match result.map(|history| history.last_close()) {
                Ok(Some(price)) => {
                    prices.insert(ticker, price);
                }
                // An empty latest-day response leaves the row out silently.
                Ok(None) => {}
                Err(e) => {
                    warn!("Error loading {} data: {}", ticker, e);
                    errors.push((ticker, e.to_string()));
                }
            }
        }

        PortfolioReport {
            valuation: self.account.read().valuate(&prices),
            errors,
        }
    }

    /// One full pass: load the market, forecast, apply `action`, value the portfolio.
    pub async fn refresh(&self, action: Option<TradeAction>) -> Dashboard {
        let market = match self.market_view().await {
            Ok(view) => {
                let forecast = self.forecast().await;
                let trade = action.map(|action| self.trade(action, view.current_price));
                let portfolio = self.portfolio_report().await;
                Ok(MarketPanel {
                    view,
                    forecast,
                    trade,
                    portfolio,
                })
            }
            Err(e) => {
                warn!("Market view for {} failed: {:#}", self.controls.ticker, e);
                Err(format!("Could not retrieve stock data: {}", user_message(&e)))
            }
        };

        Dashboard {
            controls: self.controls.clone(),
            balance: self.balance(),
            market,
        }
    }
}

/// The price-source error as the user should read it, without the fetch context.
fn user_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<MarketDataError>() {
        Some(source_error) => source_error.to_string(),
        None => format!("{:#}", error),
    }
}
