//! Plain-text rendering of a [`Dashboard`].

use std::fmt::Write;

use forecast::Outlook;
use portfolio::{Fill, Side, TradeError};

use crate::simulator::{Dashboard, ForecastOutcome, MarketPanel, PortfolioReport};
use crate::utils::{format_currency, format_signed_pct, sparkline};

pub const TITLE: &str = "💰 AI Stock Simulator";
pub const DISCLAIMER: &str =
    "Note: This is a simulation for educational purposes. AI predictions are not financial advice.";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub chart_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { chart_width: 60 }
    }
}

pub fn render_dashboard(dashboard: &Dashboard, options: &RenderOptions) -> String {
    let mut out = String::new();
    let controls = &dashboard.controls;

    let _ = writeln!(out, "{}", TITLE);
    let _ = writeln!(out, "Current Balance: {}", format_currency(dashboard.balance));
    let _ = writeln!(
        out,
        "Controls: {} | {} days | {} per trade",
        controls.ticker,
        controls.history_days,
        format_currency(controls.investment)
    );
    out.push('\n');

    match &dashboard.market {
        Ok(panel) => render_panel(&mut out, dashboard, panel, options),
        Err(message) => {
            let _ = writeln!(out, "✘ {}", message);
        }
    }

    out.push('\n');
    let _ = writeln!(out, "{}", DISCLAIMER);
    out
}

fn render_panel(out: &mut String, dashboard: &Dashboard, panel: &MarketPanel, options: &RenderOptions) {
    let ticker = &dashboard.controls.ticker;
    let history = &panel.view.history;
    let current_price = panel.view.current_price;

    let _ = writeln!(out, "{} Price History", ticker);
    let _ = writeln!(out, "  {}", sparkline(&history.closes(), options.chart_width));
    if let (Some(low), Some(high)) = (history.min_close(), history.max_close()) {
        let _ = writeln!(
            out,
            "  low {}  high {}  ({} sessions)",
            format_currency(low),
            format_currency(high),
            history.len()
        );
    }
    out.push('\n');

    let _ = writeln!(out, "Trading");
    let _ = writeln!(out, "Current Price: {}", format_currency(current_price));
    match &panel.forecast {
        ForecastOutcome::Prediction(forecast) => {
            let _ = writeln!(
                out,
                "AI {}-Day Forecast: {} ({})",
                forecast.path.len(),
                format_currency(forecast.value),
                format_signed_pct(forecast.expected_change_pct(current_price))
            );
            let outlook = forecast.outlook(current_price);
            let marker = match outlook {
                Outlook::Growth => "✔",
                Outlook::Decline => "✘",
            };
            let _ = writeln!(out, "{} AI Suggests: {}", marker, outlook);
        }
        ForecastOutcome::Unavailable(message) => {
            let _ = writeln!(out, "⚠ {}", message);
        }
    }

    if let Some(trade) = &panel.trade {
        let _ = writeln!(out, "{}", trade_message(trade));
    }
    out.push('\n');

    render_portfolio(out, &panel.portfolio);
}

pub fn trade_message(trade: &Result<Fill, TradeError>) -> String {
    match trade {
        Ok(fill) => {
            let verb = match fill.side {
                Side::Buy => "Bought",
                Side::Sell => "Sold",
            };
            format!("✔ {} {:.2} shares of {}", verb, fill.shares, fill.ticker)
        }
        Err(e) => format!("✘ {}", e),
    }
}

fn render_portfolio(out: &mut String, report: &PortfolioReport) {
    let _ = writeln!(out, "Your Portfolio");
    let _ = writeln!(out, "{:<10}{:>12}{:>18}", "Stock", "Shares", "Current Value");

    for row in &report.valuation.rows {
        let _ = writeln!(
            out,
            "{:<10}{:>12.2}{:>18}",
            row.ticker.as_str(),
            row.shares,
            format_currency(row.value)
        );
    }

    for (ticker, error) in &report.errors {
        let _ = writeln!(out, "✘ Error loading {} data: {}", ticker, error);
    }

    if report.valuation.is_empty() {
        let _ = writeln!(out, "Your portfolio is empty");
    } else {
        let _ = writeln!(
            out,
            "Total Portfolio Value: {}",
            format_currency(report.valuation.total_value)
        );
        let _ = writeln!(out, "Net Worth: {}", format_currency(report.valuation.net_worth));
    }
}

/// Lists the session's fills, newest last.
pub fn render_fills(fills: &[Fill]) -> String {
    if fills.is_empty() {
        return "No trades yet\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20}{:<6}{:<8}{:>10}{:>12}{:>14}",
        "Time", "Side", "Stock", "Shares", "Price", "Amount"
    );
    for fill in fills {
        let _ = writeln!(
            out,
            "{:<20}{:<6}{:<8}{:>10.4}{:>12}{:>14}",
            fill.timestamp.format("%Y-%m-%d %H:%M:%S"),
            fill.side.to_string(),
            fill.ticker.as_str(),
            fill.shares,
            format_currency(fill.price),
            format_currency(fill.amount)
        );
    }
    out
}
