//! Whitelist pipeline: fetch, intersect per exchange, merge

use super::{intersect, merge, ExchangeBreakdown, IntersectionRecord, Whitelist, WhitelistMetadata};
use crate::config::{ExchangeThresholds, WhitelistConfig};
use crate::error::{Result, WhitelistError};
use crate::exchanges::{DataSource, Exchange};
use crate::market_data::{DataFeedManager, RankingTable};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};

pub struct WhitelistGenerator {
    config: WhitelistConfig,
}

impl WhitelistGenerator {
    pub fn new(config: WhitelistConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WhitelistConfig {
        &self.config
    }

    /// Fetch every source and build the whitelist.
    ///
    /// Stops before any volume request when market cap data is missing.
    pub async fn generate(&self, feeds: &DataFeedManager) -> Result<Whitelist> {
        info!("🚀 Fetching market cap rankings...");
        let market_caps = feeds.market_caps().await;
        if market_caps.is_empty() {
            return Err(WhitelistError::MarketCapUnavailable);
        }

        info!("📡 Fetching volume rankings for {} exchanges...", self.config.exchanges.len());
        let mut volumes = HashMap::with_capacity(self.config.exchanges.len());
        for thresholds in &self.config.exchanges {
            let table = feeds.volumes(thresholds.exchange).await;
            volumes.insert(thresholds.exchange, table);
        }

        self.build(&market_caps, &volumes)
    }

    /// Pure part of the pipeline over tables that are already normalized.
    ///
    /// A missing or empty volume table only empties that exchange's
    /// intersection; an empty market cap table fails the run.
    pub fn build(
        &self,
        market_caps: &RankingTable,
        volumes: &HashMap<Exchange, RankingTable>,
    ) -> Result<Whitelist> {
        if market_caps.is_empty() {
            return Err(WhitelistError::MarketCapUnavailable);
        }

        let mut unavailable_sources = Vec::new();
        let mut breakdown = Vec::with_capacity(self.config.exchanges.len());
        let mut results: Vec<(Exchange, Vec<IntersectionRecord>)> = Vec::with_capacity(self.config.exchanges.len());

        for thresholds in &self.config.exchanges {
            let ExchangeThresholds {
                exchange,
                market_cap_top,
                volume_top,
            } = *thresholds;

            let records = match volumes.get(&exchange).filter(|table| !table.is_empty()) {
                Some(table) => intersect(market_caps, table, market_cap_top, volume_top, exchange),
                None => {
                    warn!("⚠️  No volume data for {}, skipping its intersection", exchange);
                    unavailable_sources.push(DataSource::Exchange(exchange));
                    Vec::new()
                }
            };

            info!("{} intersection: {} symbols ({})", exchange, records.len(), thresholds.description());
            breakdown.push(ExchangeBreakdown {
                criteria: *thresholds,
                pairs: records.len(),
            });
            results.push((exchange, records));
        }

        let entries = merge(results);
        info!("✅ Whitelist contains {} pairs", entries.len());

        let data_sources = std::iter::once(DataSource::CoinGecko)
            .chain(self.config.exchanges.iter().map(|t| DataSource::Exchange(t.exchange)))
            .collect();

        Ok(Whitelist {
            metadata: WhitelistMetadata {
                generated_at: Utc::now(),
                total_pairs: entries.len(),
                breakdown,
                data_sources,
                unavailable_sources,
            },
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::Symbol;
    use crate::market_data::{RankCandidate, RankingFeed};
    use crate::exchanges::SourceResult;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn ranked(source: DataSource, symbols: &[&str]) -> RankingTable {
        let n = symbols.len();
        RankingTable::from_candidates(
            source,
            symbols
                .iter()
                .enumerate()
                .map(|(i, s)| RankCandidate::new(Symbol::new(*s), (n - i) as f64 * 1000.0))
                .collect(),
        )
    }

    fn small_config() -> WhitelistConfig {
        WhitelistConfig {
            exchanges: vec![
                ExchangeThresholds::new(Exchange::Binance, 3, 3),
                ExchangeThresholds::new(Exchange::Okx, 3, 3),
                ExchangeThresholds::new(Exchange::Bybit, 2, 2),
            ],
            ..WhitelistConfig::default()
        }
    }

    #[test]
    fn test_build_merges_all_exchanges() {
        let caps = ranked(DataSource::CoinGecko, &["BTC", "ETH", "SOL", "XRP", "DOGE"]);
        let mut volumes = HashMap::new();
        volumes.insert(Exchange::Binance, ranked(Exchange::Binance.into(), &["BTC", "DOGE", "SOL", "ETH"]));
        volumes.insert(Exchange::Okx, ranked(Exchange::Okx.into(), &["ETH", "BTC", "XRP"]));
        volumes.insert(Exchange::Bybit, ranked(Exchange::Bybit.into(), &["SOL", "BTC"]));

        let whitelist = WhitelistGenerator::new(small_config()).build(&caps, &volumes).unwrap();

        assert_eq!(whitelist.pairs(), vec!["BTC/USDT", "ETH/USDT", "SOL/USDT"]);
        assert_eq!(
            whitelist.entries[0].exchanges,
            vec![Exchange::Binance, Exchange::Okx, Exchange::Bybit]
        );
        assert_eq!(whitelist.entries[1].exchanges, vec![Exchange::Okx]);
        assert_eq!(whitelist.entries[2].exchanges, vec![Exchange::Binance]);
        assert_eq!(whitelist.pairs_for(Exchange::Binance), Some(2));
        assert_eq!(whitelist.pairs_for(Exchange::Okx), Some(2));
        assert_eq!(whitelist.pairs_for(Exchange::Bybit), Some(1));
        assert_eq!(whitelist.metadata.total_pairs, 3);
        assert!(whitelist.metadata.unavailable_sources.is_empty());
        assert_eq!(
            whitelist.metadata.data_sources,
            vec![
                DataSource::CoinGecko,
                DataSource::Exchange(Exchange::Binance),
                DataSource::Exchange(Exchange::Okx),
                DataSource::Exchange(Exchange::Bybit),
            ]
        );
    }

    #[test]
    fn test_unavailable_exchange_degrades() {
        let caps = ranked(DataSource::CoinGecko, &["BTC", "ETH"]);
        let mut volumes = HashMap::new();
        volumes.insert(Exchange::Binance, ranked(Exchange::Binance.into(), &["ETH", "BTC"]));
        volumes.insert(Exchange::Okx, RankingTable::empty(Exchange::Okx.into()));

        let whitelist = WhitelistGenerator::new(small_config()).build(&caps, &volumes).unwrap();

        assert_eq!(whitelist.pairs(), vec!["BTC/USDT", "ETH/USDT"]);
        assert_eq!(whitelist.pairs_for(Exchange::Okx), Some(0));
        assert_eq!(whitelist.pairs_for(Exchange::Bybit), Some(0));
        assert_eq!(
            whitelist.metadata.unavailable_sources,
            vec![DataSource::Exchange(Exchange::Okx), DataSource::Exchange(Exchange::Bybit)]
        );
    }

    #[test]
    fn test_empty_market_caps_is_fatal() {
        let caps = RankingTable::empty(DataSource::CoinGecko);
        let mut volumes = HashMap::new();
        volumes.insert(Exchange::Binance, ranked(Exchange::Binance.into(), &["BTC"]));

        let result = WhitelistGenerator::new(small_config()).build(&caps, &volumes);
        assert!(matches!(result, Err(WhitelistError::MarketCapUnavailable)));
    }

    struct CountingFeed {
        source: DataSource,
        payload: &'static [u8],
        calls: Arc<AtomicU32>,
    }

    #[async_trait::async_trait]
    impl RankingFeed for CountingFeed {
        async fn fetch_raw(&self) -> SourceResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.to_vec())
        }

        fn source(&self) -> DataSource {
            self.source
        }
    }

    #[tokio::test]
    async fn test_generate_halts_without_market_caps() {
        let volume_calls = Arc::new(AtomicU32::new(0));
        let mut feeds = DataFeedManager::new(Box::new(CountingFeed {
            source: DataSource::CoinGecko,
            payload: b"[]",
            calls: Arc::new(AtomicU32::new(0)),
        }));
        feeds.add_volume_feed(
            Exchange::Binance,
            Box::new(CountingFeed {
                source: Exchange::Binance.into(),
                payload: br#"[{"symbol": "BTCUSDT", "quoteVolume": "1"}]"#,
                calls: volume_calls.clone(),
            }),
        );

        let result = WhitelistGenerator::new(small_config()).generate(&feeds).await;

        assert!(matches!(result, Err(WhitelistError::MarketCapUnavailable)));
        assert_eq!(volume_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_end_to_end() {
        let mut feeds = DataFeedManager::new(Box::new(CountingFeed {
            source: DataSource::CoinGecko,
            payload: br#"[
                {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 65000, "market_cap": 1300},
                {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": 3200, "market_cap": 400}
            ]"#,
            calls: Arc::new(AtomicU32::new(0)),
        }));
        feeds.add_volume_feed(
            Exchange::Bybit,
            Box::new(CountingFeed {
                source: Exchange::Bybit.into(),
                payload: br#"{"retCode": 0, "retMsg": "OK", "result": {"list": [
                    {"symbol": "ETHUSDT", "turnover24h": "900"},
                    {"symbol": "BTCUSDT", "turnover24h": "800"}
                ]}}"#,
                calls: Arc::new(AtomicU32::new(0)),
            }),
        );

        let whitelist = WhitelistGenerator::new(small_config()).generate(&feeds).await.unwrap();

        assert_eq!(whitelist.pairs(), vec!["BTC/USDT", "ETH/USDT"]);
        assert_eq!(whitelist.entries[0].record.volume_rank, 2);
        assert_eq!(whitelist.entries[0].exchanges, vec![Exchange::Bybit]);
        assert_eq!(
            whitelist.metadata.unavailable_sources,
            vec![DataSource::Exchange(Exchange::Binance), DataSource::Exchange(Exchange::Okx)]
        );
    }
}
