//! JSON persistence and console summary for a finished whitelist

use crate::error::Result;
use crate::whitelist::{MergedEntry, Whitelist};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairWhitelist {
    pub pair_whitelist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaEntry {
    pub market_cap_top: u32,
    pub volume_top: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_pairs: usize,
    pub criteria: BTreeMap<String, CriteriaEntry>,
    pub data_sources: Vec<String>,
    pub unavailable_sources: Vec<String>,
}

/// On-disk layout of a whitelist file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistDocument {
    pub exchange: PairWhitelist,
    pub metadata: DocumentMetadata,
    /// `<exchange>_pairs` -> intersection size
    pub exchange_breakdown: BTreeMap<String, usize>,
    pub pair_details: Vec<MergedEntry>,
}

impl From<&Whitelist> for WhitelistDocument {
    fn from(whitelist: &Whitelist) -> Self {
        let metadata = &whitelist.metadata;

        let criteria = metadata
            .breakdown
            .iter()
            .map(|b| {
                (
                    b.criteria.exchange.id().to_string(),
                    CriteriaEntry {
                        market_cap_top: b.criteria.market_cap_top,
                        volume_top: b.criteria.volume_top,
                        description: b.criteria.description(),
                    },
                )
            })
            .collect();

        let exchange_breakdown = metadata
            .breakdown
            .iter()
            .map(|b| (format!("{}_pairs", b.criteria.exchange.id()), b.pairs))
            .collect();

        Self {
            exchange: PairWhitelist {
                pair_whitelist: whitelist.pairs().into_iter().map(String::from).collect(),
            },
            metadata: DocumentMetadata {
                generated_at: metadata.generated_at,
                total_pairs: metadata.total_pairs,
                criteria,
                data_sources: metadata.data_sources.iter().map(|s| s.display_name().to_string()).collect(),
                unavailable_sources: metadata
                    .unavailable_sources
                    .iter()
                    .map(|s| s.display_name().to_string())
                    .collect(),
            },
            exchange_breakdown,
            pair_details: whitelist.entries.clone(),
        }
    }
}

/// Write the whitelist as pretty JSON, creating parent directories
pub fn save_json(whitelist: &Whitelist, path: &Path) -> Result<()> {
    let document = WhitelistDocument::from(whitelist);
    let json = serde_json::to_string_pretty(&document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    info!("💾 Whitelist saved to {}", path.display());
    Ok(())
}

/// Human-readable summary with the first `limit` pairs
pub fn text_summary(whitelist: &Whitelist, path: &Path, limit: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("Whitelist saved to {}\n", path.display()));
    out.push_str(&format!("Total pairs: {}\n", whitelist.metadata.total_pairs));
    for breakdown in &whitelist.metadata.breakdown {
        out.push_str(&format!(
            "{} intersection: {} ({})\n",
            breakdown.criteria.exchange.display_name(),
            breakdown.pairs,
            breakdown.criteria.description()
        ));
    }
    if !whitelist.metadata.unavailable_sources.is_empty() {
        let names: Vec<_> = whitelist
            .metadata
            .unavailable_sources
            .iter()
            .map(|s| s.display_name())
            .collect();
        out.push_str(&format!("Unavailable: {}\n", names.join(", ")));
    }

    let shown = limit.min(whitelist.entries.len());
    out.push_str(&format!("\nTop {} pairs (by market cap rank):\n", shown));
    for (i, entry) in whitelist.entries.iter().take(limit).enumerate() {
        let exchanges: Vec<_> = entry.exchanges.iter().map(|e| e.id()).collect();
        out.push_str(&format!(
            "{}. {} - market cap rank:{} volume rank:{} exchanges:{}\n",
            i + 1,
            entry.record.symbol,
            entry.record.market_cap_rank,
            entry.record.volume_rank,
            exchanges.join(",")
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExchangeThresholds;
    use crate::exchanges::{DataSource, Exchange, Symbol};
    use crate::whitelist::{ExchangeBreakdown, IntersectionRecord, WhitelistMetadata};

    fn entry(base: &str, rank: u32, exchanges: Vec<Exchange>) -> MergedEntry {
        let symbol = Symbol::new(base);
        MergedEntry {
            record: IntersectionRecord {
                symbol: symbol.pair(),
                base_symbol: symbol,
                market_cap_rank: rank,
                volume_rank: rank + 1,
                market_cap: 5e11,
                volume_24h: 2.5e9,
                source_exchange: exchanges[0],
            },
            exchanges,
        }
    }

    fn sample() -> Whitelist {
        let entries = vec![
            entry("BTC", 1, vec![Exchange::Binance, Exchange::Okx]),
            entry("SOL", 5, vec![Exchange::Okx]),
        ];
        Whitelist {
            metadata: WhitelistMetadata {
                generated_at: Utc::now(),
                total_pairs: entries.len(),
                breakdown: vec![
                    ExchangeBreakdown { criteria: ExchangeThresholds::new(Exchange::Binance, 100, 100), pairs: 1 },
                    ExchangeBreakdown { criteria: ExchangeThresholds::new(Exchange::Okx, 100, 100), pairs: 2 },
                    ExchangeBreakdown { criteria: ExchangeThresholds::new(Exchange::Bybit, 50, 50), pairs: 0 },
                ],
                data_sources: vec![
                    DataSource::CoinGecko,
                    Exchange::Binance.into(),
                    Exchange::Okx.into(),
                    Exchange::Bybit.into(),
                ],
                unavailable_sources: vec![Exchange::Bybit.into()],
            },
            entries,
        }
    }

    #[test]
    fn test_document_layout() {
        let value = serde_json::to_value(WhitelistDocument::from(&sample())).unwrap();

        assert_eq!(value["exchange"]["pair_whitelist"], serde_json::json!(["BTC/USDT", "SOL/USDT"]));
        assert_eq!(value["metadata"]["total_pairs"], 2);
        assert_eq!(value["metadata"]["criteria"]["bybit"]["market_cap_top"], 50);
        assert_eq!(
            value["metadata"]["criteria"]["okx"]["description"],
            "market cap top 100 ∩ volume top 100"
        );
        assert_eq!(
            value["metadata"]["data_sources"],
            serde_json::json!(["CoinGecko", "Binance", "OKX", "Bybit"])
        );
        assert_eq!(value["metadata"]["unavailable_sources"], serde_json::json!(["Bybit"]));
        assert_eq!(value["exchange_breakdown"]["okx_pairs"], 2);
        assert_eq!(value["exchange_breakdown"]["bybit_pairs"], 0);

        let btc = &value["pair_details"][0];
        assert_eq!(btc["symbol"], "BTC/USDT");
        assert_eq!(btc["base_symbol"], "BTC");
        assert_eq!(btc["market_cap_rank"], 1);
        assert_eq!(btc["volume_rank"], 2);
        assert_eq!(btc["exchange"], "binance");
        assert_eq!(btc["exchanges"], serde_json::json!(["binance", "okx"]));
    }

    #[test]
    fn test_save_json_round_trip() {
        let dir = std::env::temp_dir().join(format!("whitelist-core-report-{}", std::process::id()));
        let path = dir.join("nested").join("whitelist.json");
        let whitelist = sample();

        save_json(&whitelist, &path).unwrap();
        let saved: WhitelistDocument = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, WhitelistDocument::from(&whitelist));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_text_summary() {
        let summary = text_summary(&sample(), Path::new("out.json"), 1);

        assert!(summary.contains("Whitelist saved to out.json"));
        assert!(summary.contains("Total pairs: 2"));
        assert!(summary.contains("OKX intersection: 2 (market cap top 100 ∩ volume top 100)"));
        assert!(summary.contains("Unavailable: Bybit"));
        assert!(summary.contains("Top 1 pairs"));
        assert!(summary.contains("1. BTC/USDT - market cap rank:1 volume rank:2 exchanges:binance,okx"));
        assert!(!summary.contains("SOL/USDT"));
    }
}
