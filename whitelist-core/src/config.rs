//! Run configuration

use crate::error::{Result, WhitelistError};
use crate::exchanges::Exchange;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Top-K cuts applied to one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeThresholds {
    pub exchange: Exchange,
    pub market_cap_top: u32,
    pub volume_top: u32,
}

impl ExchangeThresholds {
    pub fn new(exchange: Exchange, market_cap_top: u32, volume_top: u32) -> Self {
        Self {
            exchange,
            market_cap_top,
            volume_top,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "market cap top {} ∩ volume top {}",
            self.market_cap_top, self.volume_top
        )
    }
}

/// Provider endpoints, including any fixed query parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub coingecko: String,
    pub binance: String,
    pub okx: String,
    pub bybit: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            coingecko: "https://api.coingecko.com/api/v3/coins/markets".to_string(),
            binance: "https://fapi.binance.com/fapi/v1/ticker/24hr".to_string(),
            okx: "https://www.okx.com/api/v5/market/tickers?instType=SWAP".to_string(),
            bybit: "https://api.bybit.com/v5/market/tickers?category=linear".to_string(),
        }
    }
}

impl Endpoints {
    pub fn for_exchange(&self, exchange: Exchange) -> &str {
        match exchange {
            Exchange::Binance => &self.binance,
            Exchange::Okx => &self.okx,
            Exchange::Bybit => &self.bybit,
        }
    }

    fn parse(name: &str, raw: &str) -> Result<Url> {
        Url::parse(raw).map_err(|e| WhitelistError::config(format!("invalid {} endpoint {:?}: {}", name, raw, e)))
    }

    pub fn coingecko_url(&self) -> Result<Url> {
        Self::parse("coingecko", &self.coingecko)
    }

    pub fn exchange_url(&self, exchange: Exchange) -> Result<Url> {
        Self::parse(exchange.id(), self.for_exchange(exchange))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitelistConfig {
    /// CoinGecko page size
    pub market_cap_limit: u32,
    /// Processing order is merge order
    pub exchanges: Vec<ExchangeThresholds>,
    /// Pause between provider calls
    pub request_interval_ms: u64,
    pub market_cap_timeout_secs: u64,
    pub exchange_timeout_secs: u64,
    /// Extra attempts for recoverable fetch errors
    pub retry_attempts: u32,
    pub endpoints: Endpoints,
    pub output_path: PathBuf,
    /// Rows printed in the console summary
    pub display_limit: usize,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            market_cap_limit: 300,
            exchanges: vec![
                ExchangeThresholds::new(Exchange::Binance, 100, 100),
                ExchangeThresholds::new(Exchange::Okx, 100, 100),
                ExchangeThresholds::new(Exchange::Bybit, 50, 50),
            ],
            request_interval_ms: 1000,
            market_cap_timeout_secs: 15,
            exchange_timeout_secs: 10,
            retry_attempts: 0,
            endpoints: Endpoints::default(),
            output_path: PathBuf::from("intersection_whitelist.json"),
            display_limit: 15,
        }
    }
}

impl WhitelistConfig {
    /// Load a JSON config file; fields it omits keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.market_cap_limit == 0 {
            return Err(WhitelistError::config("market_cap_limit must be at least 1"));
        }
        if self.exchanges.is_empty() {
            return Err(WhitelistError::config("at least one exchange must be configured"));
        }

        let mut seen = HashSet::new();
        for thresholds in &self.exchanges {
            if !seen.insert(thresholds.exchange) {
                return Err(WhitelistError::config(format!(
                    "exchange {} configured more than once",
                    thresholds.exchange
                )));
            }
            self.endpoints.exchange_url(thresholds.exchange)?;
        }
        self.endpoints.coingecko_url()?;

        Ok(())
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn market_cap_timeout(&self) -> Duration {
        Duration::from_secs(self.market_cap_timeout_secs)
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_secs)
    }
}
