//! Uniform ranking tables shared by every data source

use crate::exchanges::{DataSource, Symbol};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// One ranked asset from a single source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub symbol: Symbol,
    /// Dense, 1-based
    pub rank: u32,
    /// Market cap or 24h quote volume, depending on the source
    pub metric_value: f64,
    #[serde(default)]
    pub extra: HashMap<String, Value>,
}

impl RankingEntry {
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// A qualifying provider record that has not been ranked yet
#[derive(Debug, Clone)]
pub struct RankCandidate {
    pub symbol: Symbol,
    pub metric_value: f64,
    pub extra: HashMap<String, Value>,
}

impl RankCandidate {
    pub fn new(symbol: Symbol, metric_value: f64) -> Self {
        Self {
            symbol,
            metric_value,
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Symbol -> entry mapping for one metric from one source
#[derive(Debug, Clone)]
pub struct RankingTable {
    source: DataSource,
    entries: HashMap<Symbol, RankingEntry>,
}

impl RankingTable {
    /// Table for a source that returned nothing this run
    pub fn empty(source: DataSource) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }

    /// Rank candidates by descending metric.
    ///
    /// The sort is stable, so equal metrics keep provider response order. When
    /// two candidates share a symbol only the first one after sorting is kept,
    /// which keeps ranks dense.
    pub fn from_candidates(source: DataSource, mut candidates: Vec<RankCandidate>) -> Self {
        candidates.sort_by_key(|c| Reverse(OrderedFloat(c.metric_value)));

        let mut entries = HashMap::with_capacity(candidates.len());
        for candidate in candidates {
            if entries.contains_key(&candidate.symbol) {
                continue;
            }
            let rank = entries.len() as u32 + 1;
            entries.insert(
                candidate.symbol.clone(),
                RankingEntry {
                    symbol: candidate.symbol,
                    rank,
                    metric_value: candidate.metric_value,
                    extra: candidate.extra,
                },
            );
        }

        Self { source, entries }
    }

    /// Build a table from entries that already carry their ranks
    pub fn from_entries(source: DataSource, entries: impl IntoIterator<Item = RankingEntry>) -> Self {
        Self {
            source,
            entries: entries
                .into_iter()
                .map(|entry| (entry.symbol.clone(), entry))
                .collect(),
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&RankingEntry> {
        self.entries.get(symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbols ranked within the top `k`
    pub fn top(&self, k: u32) -> HashSet<&Symbol> {
        self.entries
            .values()
            .filter(|entry| entry.rank <= k)
            .map(|entry| &entry.symbol)
            .collect()
    }

    /// Entries in rank order
    pub fn ranked(&self) -> Vec<&RankingEntry> {
        let mut ranked: Vec<_> = self.entries.values().collect();
        ranked.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.symbol.cmp(&b.symbol)));
        ranked
    }
}
