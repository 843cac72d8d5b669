//! Provider payloads in, uniform ranking tables out

pub mod ranking;
pub mod normalizers;
pub mod symbol_mapper;
pub mod data_feeds;

pub use ranking::{RankingEntry, RankingTable, RankCandidate};
pub use normalizers::{CoinGeckoNormalizer, BinanceNormalizer, OkxNormalizer, BybitNormalizer, normalizer_for};
pub use symbol_mapper::SymbolMapper;
pub use data_feeds::{DataFeedManager, RankingFeed, CoinGeckoFeed, ExchangeTickerFeed, ReplayFeed};

use crate::exchanges::{DataSource, SourceResult};

/// Turns one provider's raw response into a ranking table.
///
/// An `Err` means the whole payload is unusable (bad JSON, failed envelope
/// check). Individual records that miss required fields are dropped without
/// failing the payload.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &[u8]) -> SourceResult<RankingTable>;
    fn source(&self) -> DataSource;
}
