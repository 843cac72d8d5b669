//! Intersection Whitelist Library
//!
//! Builds a trading pair whitelist from symbols that rank inside both the
//! CoinGecko market cap top N and an exchange's 24h volume top M, then
//! merges the per-exchange results into one list ordered by market cap rank.

pub mod config;
pub mod error;
pub mod exchanges;
pub mod market_data;
pub mod report;
pub mod whitelist;

// Re-export main types for easy access
pub use config::{Endpoints, ExchangeThresholds, WhitelistConfig};
pub use error::{Result, WhitelistError};
pub use exchanges::{DataSource, Exchange, SourceError, Symbol};
pub use market_data::{DataFeedManager, RankingEntry, RankingTable};
pub use report::{save_json, text_summary, WhitelistDocument};
pub use whitelist::{
    intersect, merge, IntersectionRecord, MergedEntry, Whitelist, WhitelistGenerator, WhitelistMetadata,
};
