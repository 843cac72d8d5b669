//! Ranking intersection and multi-exchange merge

pub mod intersection;
pub mod merger;
pub mod generator;

pub use intersection::intersect;
pub use merger::{merge, upsert, Upsert};
pub use generator::WhitelistGenerator;

use crate::config::ExchangeThresholds;
use crate::exchanges::{DataSource, Exchange, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A symbol that made both top-K cuts on one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionRecord {
    /// Pair form, e.g. `BTC/USDT`
    pub symbol: String,
    pub base_symbol: Symbol,
    pub market_cap_rank: u32,
    pub volume_rank: u32,
    pub market_cap: f64,
    pub volume_24h: f64,
    #[serde(rename = "exchange")]
    pub source_exchange: Exchange,
}

/// Intersection record plus every exchange that backs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntry {
    #[serde(flatten)]
    pub record: IntersectionRecord,
    /// In processing order, no repeats
    pub exchanges: Vec<Exchange>,
}

impl MergedEntry {
    pub fn from_record(record: IntersectionRecord, exchange: Exchange) -> Self {
        Self {
            record,
            exchanges: vec![exchange],
        }
    }

    pub fn symbol(&self) -> &str {
        &self.record.symbol
    }
}

/// Intersection size and thresholds for one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeBreakdown {
    pub criteria: ExchangeThresholds,
    pub pairs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_pairs: usize,
    /// In processing order
    pub breakdown: Vec<ExchangeBreakdown>,
    pub data_sources: Vec<DataSource>,
    pub unavailable_sources: Vec<DataSource>,
}

/// Final merged whitelist, ascending by market cap rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Whitelist {
    pub entries: Vec<MergedEntry>,
    pub metadata: WhitelistMetadata,
}

impl Whitelist {
    pub fn pairs(&self) -> Vec<&str> {
        self.entries.iter().map(MergedEntry::symbol).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pairs_for(&self, exchange: Exchange) -> Option<usize> {
        self.metadata
            .breakdown
            .iter()
            .find(|b| b.criteria.exchange == exchange)
            .map(|b| b.pairs)
    }
}
