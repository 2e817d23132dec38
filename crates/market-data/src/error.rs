use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Invalid ticker '{input}': {reason}")]
    InvalidTicker { input: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Price API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Price API error {code}: {description}")]
    Api { code: String, description: String },

    #[error("No data returned for {ticker}")]
    NoData { ticker: String },

    #[error("Failed to decode price data: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarketDataError>;
