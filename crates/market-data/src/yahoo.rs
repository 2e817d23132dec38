use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{MarketDataError, Result};
use crate::source::PriceSource;
use crate::types::{HistoryRange, PriceBar, PriceHistory, Ticker};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            user_agent: "Mozilla/5.0 (stock-sim)".to_string(),
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily bars from the public Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    config: YahooConfig,
}

impl YahooClient {
    pub fn new(config: YahooConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            config,
        })
    }

    fn chart_url(&self, ticker: &Ticker) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }

    async fn fetch_once(&self, ticker: &Ticker, range: HistoryRange) -> Result<PriceHistory> {
        let url = self.chart_url(ticker);
        let range_token = range.as_query();

        let response = self
            .client
            .get(&url)
            .query(&[("range", range_token.as_str()), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // The endpoint reports unknown symbols as 404 with a chart.error payload.
            if let Ok(parsed) = serde_json::from_str::<ChartResponse>(&body) {
                if let Some(error) = parsed.chart.error {
                    return Err(MarketDataError::Api {
                        code: error.code,
                        description: error.description,
                    });
                }
            }
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChartResponse = serde_json::from_str(&body)?;
        parse_chart(ticker, parsed)
    }
}

fn parse_chart(ticker: &Ticker, response: ChartResponse) -> Result<PriceHistory> {
    if let Some(error) = response.chart.error {
        return Err(MarketDataError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let no_data = || MarketDataError::NoData {
        ticker: ticker.to_string(),
    };

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(no_data)?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    let bars: Vec<PriceBar> = timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let timestamp = Utc.timestamp_opt(*ts, 0).single()?;
            Some(PriceBar::new(timestamp, close))
        })
        .collect();

    if bars.is_empty() {
        return Err(no_data());
    }

    Ok(PriceHistory::new(ticker.clone(), bars))
}

fn is_transient(error: &MarketDataError) -> bool {
    match error {
        MarketDataError::Http(e) => e.is_timeout() || e.is_connect(),
        MarketDataError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        _ => false,
    }
}

impl PriceSource for YahooClient {
    async fn daily_history(&self, ticker: &Ticker, range: HistoryRange) -> Result<PriceHistory> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            match self.fetch_once(ticker, range).await {
                Ok(history) => {
                    info!(
                        "Fetched {} daily bars for {} ({}) in {:?}",
                        history.len(),
                        ticker,
                        range,
                        start.elapsed()
                    );
                    return Ok(history);
                }
                Err(e) if attempt < self.config.max_retries && is_transient(&e) => {
                    attempt += 1;
                    let delay = Duration::from_millis(self.config.retry_backoff_ms * attempt as u64);
                    warn!("Fetch for {} failed ({}), retry {} in {:?}", ticker, e, attempt, delay);
                    sleep(delay).await;
                }
                Err(e) => {
                    debug!("Fetch for {} gave up after {} attempts", ticker, attempt + 1);
                    return Err(e);
                }
            }
        }
    }
}
