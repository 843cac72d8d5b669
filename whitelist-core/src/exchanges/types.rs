//! Exchange and data source types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote currency every whitelisted pair trades against
pub const QUOTE_CURRENCY: &str = "USDT";

/// Canonical base asset symbol (uppercase, quote suffix stripped)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Exchange tickers only; CoinGecko symbols may carry `-`, `+` or `.`
    pub fn validate(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pair form used in the whitelist, e.g. `BTC/USDT`
    pub fn pair(&self) -> String {
        format!("{}/{}", self.0, QUOTE_CURRENCY)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Okx,
    Bybit,
}

impl Exchange {
    /// Lowercase identifier used for provenance and file names
    pub fn id(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Okx => "okx",
            Exchange::Bybit => "bybit",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Exchange::Binance => "Binance",
            Exchange::Okx => "OKX",
            Exchange::Bybit => "Bybit",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Where a ranking table came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    CoinGecko,
    #[serde(untagged)]
    Exchange(Exchange),
}

impl DataSource {
    pub fn id(&self) -> &'static str {
        match self {
            DataSource::CoinGecko => "coingecko",
            DataSource::Exchange(exchange) => exchange.id(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DataSource::CoinGecko => "CoinGecko",
            DataSource::Exchange(exchange) => exchange.display_name(),
        }
    }
}

impl From<Exchange> for DataSource {
    fn from(exchange: Exchange) -> Self {
        DataSource::Exchange(exchange)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
