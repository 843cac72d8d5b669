//! Error types for whitelist generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, WhitelistError>;

/// Failures that stop a whitelist run.
///
/// An unavailable volume source is not in here: it degrades to an empty
/// intersection for that exchange and the run carries on.
#[derive(Error, Debug)]
pub enum WhitelistError {
    /// No market cap data, so there is nothing to rank against.
    #[error("Market cap data unavailable; no whitelist generated")]
    MarketCapUnavailable,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WhitelistError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        WhitelistError::Config(msg.into())
    }
}
