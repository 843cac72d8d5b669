use super::{normalizer_for, RankingTable, SymbolMapper};
use crate::config::WhitelistConfig;
use crate::error::Result;
use crate::exchanges::{DataSource, Exchange, SourceError, SourceResult};
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Raw payload source for one provider
#[async_trait::async_trait]
pub trait RankingFeed: Send + Sync {
    async fn fetch_raw(&self) -> SourceResult<Vec<u8>>;
    fn source(&self) -> DataSource;
}

async fn get_bytes(client: &Client, url: Url, timeout: Duration) -> SourceResult<Vec<u8>> {
    let response = client.get(url).timeout(timeout).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Http { status: status.as_u16() });
    }

    Ok(response.bytes().await?.to_vec())
}

/// CoinGecko `/coins/markets`, first page ordered by market cap
#[derive(Debug, Clone)]
pub struct CoinGeckoFeed {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl CoinGeckoFeed {
    pub fn new(client: Client, endpoint: Url, per_page: u32, timeout: Duration) -> Self {
        let mut url = endpoint;
        url.query_pairs_mut()
            .append_pair("vs_currency", "usd")
            .append_pair("order", "market_cap_desc")
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", "1")
            .append_pair("sparkline", "false");

        Self { client, url, timeout }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl RankingFeed for CoinGeckoFeed {
    async fn fetch_raw(&self) -> SourceResult<Vec<u8>> {
        get_bytes(&self.client, self.url.clone(), self.timeout).await
    }

    fn source(&self) -> DataSource {
        DataSource::CoinGecko
    }
}

/// Public 24h ticker endpoint of one exchange
#[derive(Debug, Clone)]
pub struct ExchangeTickerFeed {
    client: Client,
    exchange: Exchange,
    url: Url,
    timeout: Duration,
}

impl ExchangeTickerFeed {
    pub fn new(client: Client, exchange: Exchange, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            exchange,
            url,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl RankingFeed for ExchangeTickerFeed {
    async fn fetch_raw(&self) -> SourceResult<Vec<u8>> {
        get_bytes(&self.client, self.url.clone(), self.timeout).await
    }

    fn source(&self) -> DataSource {
        DataSource::Exchange(self.exchange)
    }
}

/// Payload previously saved to disk
#[derive(Debug, Clone)]
pub struct ReplayFeed {
    source: DataSource,
    path: PathBuf,
}

impl ReplayFeed {
    pub fn new(source: DataSource, path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            path: path.into(),
        }
    }

    /// `<dir>/<source id>.json`
    pub fn in_dir(dir: &Path, source: DataSource) -> Self {
        Self::new(source, dir.join(format!("{}.json", source.id())))
    }
}

#[async_trait::async_trait]
impl RankingFeed for ReplayFeed {
    async fn fetch_raw(&self) -> SourceResult<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    fn source(&self) -> DataSource {
        self.source
    }
}

/// Fetches and normalizes every source, absorbing failures as empty tables
pub struct DataFeedManager {
    market_cap_feed: Box<dyn RankingFeed>,
    volume_feeds: HashMap<Exchange, Box<dyn RankingFeed>>,
    symbol_mapper: Arc<SymbolMapper>,
    request_interval: Duration,
    retry_attempts: u32,
}

impl DataFeedManager {
    pub fn new(market_cap_feed: Box<dyn RankingFeed>) -> Self {
        Self {
            market_cap_feed,
            volume_feeds: HashMap::new(),
            symbol_mapper: Arc::new(SymbolMapper::new()),
            request_interval: Duration::ZERO,
            retry_attempts: 0,
        }
    }

    /// Live HTTP feeds for CoinGecko and every configured exchange
    pub fn from_config(config: &WhitelistConfig) -> Result<Self> {
        let client = Client::new();

        let market_cap_feed = CoinGeckoFeed::new(
            client.clone(),
            config.endpoints.coingecko_url()?,
            config.market_cap_limit,
            config.market_cap_timeout(),
        );

        let mut manager = Self::new(Box::new(market_cap_feed))
            .with_request_interval(config.request_interval())
            .with_retry_attempts(config.retry_attempts);

        for thresholds in &config.exchanges {
            let exchange = thresholds.exchange;
            let feed = ExchangeTickerFeed::new(
                client.clone(),
                exchange,
                config.endpoints.exchange_url(exchange)?,
                config.exchange_timeout(),
            );
            manager.add_volume_feed(exchange, Box::new(feed));
        }

        Ok(manager)
    }

    /// Saved payloads from `dir`, no pacing between reads
    pub fn replay(dir: &Path, config: &WhitelistConfig) -> Self {
        let mut manager = Self::new(Box::new(ReplayFeed::in_dir(dir, DataSource::CoinGecko)));
        for thresholds in &config.exchanges {
            let exchange = thresholds.exchange;
            manager.add_volume_feed(exchange, Box::new(ReplayFeed::in_dir(dir, exchange.into())));
        }
        manager
    }

    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn add_volume_feed(&mut self, exchange: Exchange, feed: Box<dyn RankingFeed>) {
        self.volume_feeds.insert(exchange, feed);
    }

    pub fn symbol_mapper(&self) -> &Arc<SymbolMapper> {
        &self.symbol_mapper
    }

    /// Market cap rankings; empty when CoinGecko could not be read
    pub async fn market_caps(&self) -> RankingTable {
        self.fetch_table(self.market_cap_feed.as_ref()).await
    }

    /// Volume rankings for one exchange; empty when it is unavailable.
    ///
    /// Always called after `market_caps`, so it waits out the request
    /// interval first.
    pub async fn volumes(&self, exchange: Exchange) -> RankingTable {
        let Some(feed) = self.volume_feeds.get(&exchange) else {
            warn!("⚠️  No volume feed configured for {}", exchange);
            return RankingTable::empty(exchange.into());
        };

        self.pace().await;
        self.fetch_table(feed.as_ref()).await
    }

    async fn pace(&self) {
        if !self.request_interval.is_zero() {
            tokio::time::sleep(self.request_interval).await;
        }
    }

    async fn fetch_table(&self, feed: &dyn RankingFeed) -> RankingTable {
        let source = feed.source();
        let mut attempt = 0;

        let raw = loop {
            match feed.fetch_raw().await {
                Ok(raw) => break raw,
                Err(e) if e.should_retry() && attempt < self.retry_attempts => {
                    attempt += 1;
                    warn!("{} request failed ({}), retry {}/{}", source, e, attempt, self.retry_attempts);
                    self.pace().await;
                }
                Err(e) => {
                    warn!("⚠️  {} unavailable: {}", source, e);
                    return RankingTable::empty(source);
                }
            }
        };

        let normalizer = normalizer_for(source, self.symbol_mapper.clone());
        match normalizer.normalize(&raw) {
            Ok(table) => {
                info!("📊 {} returned {} ranked symbols", source, table.len());
                let (hits, misses, hit_rate) = self.symbol_mapper.get_cache_stats();
                debug!("Symbol mapper: {} hits, {} misses ({:.1}% hit rate)", hits, misses, hit_rate * 100.0);
                let leaders: Vec<&str> = table
                    .ranked()
                    .into_iter()
                    .take(5)
                    .map(|entry| entry.extra_str("pair").unwrap_or(entry.symbol.as_str()))
                    .collect();
                debug!("{} leaders: {}", source, leaders.join(", "));
                table
            }
            Err(e) => {
                warn!("⚠️  {} payload rejected: {}", source, e);
                RankingTable::empty(source)
            }
        }
    }
}
