//! Provider-specific normalizers

use super::{Normalizer, RankCandidate, RankingTable, SymbolMapper};
use crate::exchanges::{DataSource, Exchange, SourceError, SourceResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// CoinGecko `/coins/markets` item
#[derive(Deserialize, Debug)]
struct CoinGeckoMarket {
    #[serde(default)]
    id: Option<String>,
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    market_cap: Option<f64>,
}

/// Binance futures 24hr ticker
#[derive(Deserialize, Debug)]
struct BinanceTicker {
    symbol: String,
    #[serde(rename = "quoteVolume")]
    quote_volume: String,
}

#[derive(Deserialize, Debug)]
struct OkxEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Deserialize, Debug)]
struct OkxTicker {
    #[serde(rename = "instId")]
    inst_id: String,
    #[serde(rename = "volCcy24h")]
    vol_ccy_24h: String,
}

#[derive(Deserialize, Debug)]
struct BybitEnvelope {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<BybitResult>,
}

#[derive(Deserialize, Debug)]
struct BybitResult {
    #[serde(default)]
    list: Vec<Value>,
}

#[derive(Deserialize, Debug)]
struct BybitTicker {
    symbol: String,
    #[serde(rename = "turnover24h")]
    turnover_24h: String,
}

/// Decode each item independently so one bad record cannot sink the payload
fn decode_records<T: DeserializeOwned>(items: Vec<Value>) -> (Vec<T>, usize) {
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let skipped = total - records.len();
    (records, skipped)
}

fn parse_metric(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Shared path for exchange tickers: suffix filter, metric parse, ranking
fn rank_tickers<'a>(
    mapper: &SymbolMapper,
    source: DataSource,
    tickers: impl Iterator<Item = (&'a str, &'a str)>,
    mut skipped: usize,
) -> RankingTable {
    let mut candidates = Vec::new();
    for (pair, volume) in tickers {
        let Some(base) = mapper.to_base(pair, source) else {
            // Other quote currencies are not candidates at all
            continue;
        };
        match parse_metric(volume) {
            Some(volume) => candidates.push(RankCandidate::new(base, volume).with_extra("pair", pair)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("{}: skipped {} malformed records", source, skipped);
    }
    RankingTable::from_candidates(source, candidates)
}

/// Market cap rankings from CoinGecko
pub struct CoinGeckoNormalizer {
    symbol_mapper: Arc<SymbolMapper>,
}

impl CoinGeckoNormalizer {
    pub fn new(symbol_mapper: Arc<SymbolMapper>) -> Self {
        Self { symbol_mapper }
    }
}

impl Normalizer for CoinGeckoNormalizer {
    fn normalize(&self, raw: &[u8]) -> SourceResult<RankingTable> {
        let items: Vec<Value> = serde_json::from_slice(raw)?;
        let (markets, mut skipped) = decode_records::<CoinGeckoMarket>(items);

        let mut candidates = Vec::with_capacity(markets.len());
        for market in markets {
            let base = self.symbol_mapper.to_base(&market.symbol, DataSource::CoinGecko);
            let market_cap = market.market_cap.filter(|v| v.is_finite() && *v >= 0.0);
            let (Some(base), Some(market_cap)) = (base, market_cap) else {
                skipped += 1;
                continue;
            };

            let mut candidate = RankCandidate::new(base, market_cap);
            if let Some(id) = market.id {
                candidate = candidate.with_extra("id", id);
            }
            if let Some(name) = market.name {
                candidate = candidate.with_extra("name", name);
            }
            if let Some(price) = market.current_price {
                candidate = candidate.with_extra("price", price);
            }
            candidates.push(candidate);
        }

        if skipped > 0 {
            debug!("CoinGecko: skipped {} malformed records", skipped);
        }
        Ok(RankingTable::from_candidates(DataSource::CoinGecko, candidates))
    }

    fn source(&self) -> DataSource {
        DataSource::CoinGecko
    }
}

/// 24h quote volume rankings from Binance USDT-M futures
pub struct BinanceNormalizer {
    symbol_mapper: Arc<SymbolMapper>,
}

impl BinanceNormalizer {
    pub fn new(symbol_mapper: Arc<SymbolMapper>) -> Self {
        Self { symbol_mapper }
    }
}

impl Normalizer for BinanceNormalizer {
    fn normalize(&self, raw: &[u8]) -> SourceResult<RankingTable> {
        let items: Vec<Value> = serde_json::from_slice(raw)?;
        let (tickers, skipped) = decode_records::<BinanceTicker>(items);

        Ok(rank_tickers(
            &self.symbol_mapper,
            self.source(),
            tickers.iter().map(|t| (t.symbol.as_str(), t.quote_volume.as_str())),
            skipped,
        ))
    }

    fn source(&self) -> DataSource {
        DataSource::Exchange(Exchange::Binance)
    }
}

/// 24h volume rankings from OKX perpetual swaps
pub struct OkxNormalizer {
    symbol_mapper: Arc<SymbolMapper>,
}

impl OkxNormalizer {
    pub fn new(symbol_mapper: Arc<SymbolMapper>) -> Self {
        Self { symbol_mapper }
    }
}

impl Normalizer for OkxNormalizer {
    fn normalize(&self, raw: &[u8]) -> SourceResult<RankingTable> {
        let envelope: OkxEnvelope = serde_json::from_slice(raw)?;
        if envelope.code != "0" {
            return Err(SourceError::Api {
                code: envelope.code,
                message: envelope.msg,
            });
        }

        let (tickers, skipped) = decode_records::<OkxTicker>(envelope.data);
        Ok(rank_tickers(
            &self.symbol_mapper,
            self.source(),
            tickers.iter().map(|t| (t.inst_id.as_str(), t.vol_ccy_24h.as_str())),
            skipped,
        ))
    }

    fn source(&self) -> DataSource {
        DataSource::Exchange(Exchange::Okx)
    }
}

/// 24h turnover rankings from Bybit linear contracts
pub struct BybitNormalizer {
    symbol_mapper: Arc<SymbolMapper>,
}

impl BybitNormalizer {
    pub fn new(symbol_mapper: Arc<SymbolMapper>) -> Self {
        Self { symbol_mapper }
    }
}

impl Normalizer for BybitNormalizer {
    fn normalize(&self, raw: &[u8]) -> SourceResult<RankingTable> {
        let envelope: BybitEnvelope = serde_json::from_slice(raw)?;
        if envelope.ret_code != 0 {
            return Err(SourceError::Api {
                code: envelope.ret_code.to_string(),
                message: envelope.ret_msg,
            });
        }

        let items = envelope.result.map(|r| r.list).unwrap_or_default();
        let (tickers, skipped) = decode_records::<BybitTicker>(items);
        Ok(rank_tickers(
            &self.symbol_mapper,
            self.source(),
            tickers.iter().map(|t| (t.symbol.as_str(), t.turnover_24h.as_str())),
            skipped,
        ))
    }

    fn source(&self) -> DataSource {
        DataSource::Exchange(Exchange::Bybit)
    }
}

/// Normalizer matching a data source
pub fn normalizer_for(source: DataSource, symbol_mapper: Arc<SymbolMapper>) -> Box<dyn Normalizer> {
    match source {
        DataSource::CoinGecko => Box::new(CoinGeckoNormalizer::new(symbol_mapper)),
        DataSource::Exchange(Exchange::Binance) => Box::new(BinanceNormalizer::new(symbol_mapper)),
        DataSource::Exchange(Exchange::Okx) => Box::new(OkxNormalizer::new(symbol_mapper)),
        DataSource::Exchange(Exchange::Bybit) => Box::new(BybitNormalizer::new(symbol_mapper)),
    }
}
