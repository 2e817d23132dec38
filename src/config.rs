//! Configuration management

use std::env;
use std::path::Path;

use forecast::ForecastConfig;
use market_data::{Ticker, YahooConfig};
use portfolio::{TradeLimits, DEFAULT_STARTING_BALANCE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub account: AccountConfig,
    pub controls: ControlsConfig,
    pub forecast: ForecastConfig,
    pub yahoo: YahooConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub starting_balance: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub default_ticker: String,
    pub default_history_days: u32,
    pub min_history_days: u32,
    pub max_history_days: u32,
    pub default_investment: f64,
    pub trade_limits: TradeLimits,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            default_ticker: "AAPL".to_string(),
            default_history_days: 90,
            min_history_days: 30,
            max_history_days: 365,
            default_investment: 100.0,
            trade_limits: TradeLimits::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SimulatorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Applies `STOCK_SIM_*` environment variables on top of the loaded values,
    /// then validates the result.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = env::var("STOCK_SIM_YAHOO_BASE_URL") {
            self.yahoo.base_url = url;
        }
        if let Some(timeout) = env_number("STOCK_SIM_TIMEOUT_MS")? {
            self.yahoo.timeout_ms = timeout;
        }
        if let Some(balance) = env_number("STOCK_SIM_STARTING_BALANCE")? {
            self.account.starting_balance = balance;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let controls = &self.controls;
        let limits = &controls.trade_limits;

        if !self.account.starting_balance.is_finite() || self.account.starting_balance < 0.0 {
            return Err(ConfigError::Invalid(
                "starting_balance must be a non-negative number".to_string(),
            ));
        }

        Ticker::parse(&controls.default_ticker)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if controls.min_history_days == 0 || controls.min_history_days > controls.max_history_days {
            return Err(ConfigError::Invalid(format!(
                "history day bounds {}..={} are inconsistent",
                controls.min_history_days, controls.max_history_days
            )));
        }
        if !(controls.min_history_days..=controls.max_history_days)
            .contains(&controls.default_history_days)
        {
            return Err(ConfigError::Invalid(format!(
                "default_history_days {} is outside {}..={}",
                controls.default_history_days, controls.min_history_days, controls.max_history_days
            )));
        }

        if !(limits.min_amount > 0.0 && limits.min_amount <= limits.max_amount) {
            return Err(ConfigError::Invalid(format!(
                "trade limits {}..={} are inconsistent",
                limits.min_amount, limits.max_amount
            )));
        }
        if controls.default_investment < limits.min_amount
            || controls.default_investment > limits.max_amount
        {
            return Err(ConfigError::Invalid(format!(
                "default_investment {} is outside {}..={}",
                controls.default_investment, limits.min_amount, limits.max_amount
            )));
        }

        self.forecast
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.yahoo.timeout_ms == 0 {
            return Err(ConfigError::Invalid("yahoo.timeout_ms must be positive".to_string()));
        }

        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.account.starting_balance, 10_000.0);
        assert_eq!(config.controls.default_ticker, "AAPL");
        assert_eq!(config.controls.default_history_days, 90);
        assert_eq!(config.forecast.horizon_days, 7);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SimulatorConfig = toml::from_str(
            r#"
            [account]
            starting_balance = 2500.0

            [controls]
            default_ticker = "msft"

            [controls.trade_limits]
            max_amount = 500.0
            "#,
        )
        .unwrap();

        assert_eq!(config.account.starting_balance, 2_500.0);
        assert_eq!(config.controls.default_ticker, "msft");
        assert_eq!(config.controls.trade_limits.min_amount, 10.0);
        assert_eq!(config.controls.trade_limits.max_amount, 500.0);
        assert_eq!(config.forecast.min_observations, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("stock-sim-config-{}.toml", uuid::Uuid::new_v4()));
        let mut config = SimulatorConfig::default();
        config.controls.default_history_days = 180;

        config.save_to_file(&path).unwrap();
        let loaded = SimulatorConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_rejects_inconsistent_values() {
        let mut config = SimulatorConfig::default();
        config.controls.default_history_days = 400;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimulatorConfig::default();
        config.controls.default_investment = 5.0;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.controls.default_ticker = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.forecast.horizon_days = 0;
        assert!(config.validate().is_err());
    }

    const OVERRIDES: [&str; 3] = [
        "STOCK_SIM_YAHOO_BASE_URL",
        "STOCK_SIM_TIMEOUT_MS",
        "STOCK_SIM_STARTING_BALANCE",
    ];

    /// Puts the override variables back the way they were.
    struct EnvGuard(Vec<(&'static str, Option<String>)>);

    impl EnvGuard {
        fn capture() -> Self {
            Self(OVERRIDES.iter().map(|name| (*name, env::var(name).ok())).collect())
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.0 {
                match value {
                    Some(value) => env::set_var(name, value),
                    None => env::remove_var(name),
                }
            }
        }
    }

    // One test owns the variables so parallel tests never race on them.
    #[test]
    fn test_env_overrides() {
        let _guard = EnvGuard::capture();
        for name in OVERRIDES {
            env::remove_var(name);
        }

        let mut config = SimulatorConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config, SimulatorConfig::default());

        env::set_var("STOCK_SIM_YAHOO_BASE_URL", "http://localhost:9000");
        env::set_var("STOCK_SIM_TIMEOUT_MS", "2500");
        env::set_var("STOCK_SIM_STARTING_BALANCE", " 25000.5 ");
        let mut config = SimulatorConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.yahoo.base_url, "http://localhost:9000");
        assert_eq!(config.yahoo.timeout_ms, 2_500);
        assert_eq!(config.account.starting_balance, 25_000.5);

        env::set_var("STOCK_SIM_TIMEOUT_MS", "soon");
        let err = SimulatorConfig::default().apply_env_overrides().unwrap_err();
        assert!(err.to_string().contains("STOCK_SIM_TIMEOUT_MS"));

        env::set_var("STOCK_SIM_TIMEOUT_MS", "0");
        assert!(matches!(
            SimulatorConfig::default().apply_env_overrides(),
            Err(ConfigError::Invalid(_))
        ));

        env::remove_var("STOCK_SIM_TIMEOUT_MS");
        env::set_var("STOCK_SIM_STARTING_BALANCE", "-1");
        assert!(SimulatorConfig::default().apply_env_overrides().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimulatorConfig::load_from_file("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
