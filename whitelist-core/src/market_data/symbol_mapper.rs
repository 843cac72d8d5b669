//! Mapping from exchange pair identifiers to canonical base symbols

use crate::exchanges::{DataSource, Exchange, Symbol};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Strips per-exchange quote suffixes and caches what it has learned
pub struct SymbolMapper {
    exchange_to_base: DashMap<(String, DataSource), Symbol>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl SymbolMapper {
    pub fn new() -> Self {
        Self {
            exchange_to_base: DashMap::new(),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    /// Suffix that marks a USDT-quoted contract on each source
    pub fn quote_suffix(source: DataSource) -> Option<&'static str> {
        match source {
            DataSource::CoinGecko => None,
            // Linear perpetuals are listed as BASEQUOTE, e.g. BTCUSDT
            DataSource::Exchange(Exchange::Binance) | DataSource::Exchange(Exchange::Bybit) => Some("USDT"),
            // OKX uses BASE-QUOTE-SWAP, e.g. BTC-USDT-SWAP
            DataSource::Exchange(Exchange::Okx) => Some("-USDT-SWAP"),
        }
    }

    fn add_mapping(&self, exchange_symbol: &str, source: DataSource, base: Symbol) {
        self.exchange_to_base.insert((exchange_symbol.to_string(), source), base);
    }

    /// Base symbol for a provider identifier, or `None` if it is not a
    /// USDT-quoted instrument.
    pub fn to_base(&self, exchange_symbol: &str, source: DataSource) -> Option<Symbol> {
        let result = self
            .exchange_to_base
            .get(&(exchange_symbol.to_string(), source))
            .map(|e| e.clone());

        if result.is_some() {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return result;
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        let base = Self::infer_base(exchange_symbol, source)?;
        self.add_mapping(exchange_symbol, source, base.clone());
        Some(base)
    }

    fn infer_base(exchange_symbol: &str, source: DataSource) -> Option<Symbol> {
        let upper = exchange_symbol.trim().to_uppercase();
        let base = match Self::quote_suffix(source) {
            Some(suffix) => upper.strip_suffix(suffix)?.to_string(),
            None => upper,
        };

        let symbol = Symbol::new(base);
        let qualifies = match source {
            // Any non-empty ticker ranks, e.g. BSC-USD or USDC.E
            DataSource::CoinGecko => !symbol.is_empty(),
            DataSource::Exchange(_) => symbol.validate(),
        };
        qualifies.then_some(symbol)
    }

    pub fn get_cache_stats(&self) -> (u64, u64, f64) {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }
}

impl Default for SymbolMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_exchange_suffixes() {
        let mapper = SymbolMapper::new();

        assert_eq!(
            mapper.to_base("BTCUSDT", Exchange::Binance.into()),
            Some(Symbol::new("BTC"))
        );
        assert_eq!(
            mapper.to_base("ETH-USDT-SWAP", Exchange::Okx.into()),
            Some(Symbol::new("ETH"))
        );
        assert_eq!(
            mapper.to_base("1000PEPEUSDT", Exchange::Bybit.into()),
            Some(Symbol::new("1000PEPE"))
        );
        assert_eq!(mapper.to_base("sol", DataSource::CoinGecko), Some(Symbol::new("SOL")));
    }

    #[test]
    fn test_rejects_other_quotes() {
        let mapper = SymbolMapper::new();

        assert_eq!(mapper.to_base("BTCUSDC", Exchange::Binance.into()), None);
        assert_eq!(mapper.to_base("BTCUSDT_250328", Exchange::Binance.into()), None);
        assert_eq!(mapper.to_base("BTC-USD-SWAP", Exchange::Okx.into()), None);
        assert_eq!(mapper.to_base("BTC-USDT", Exchange::Okx.into()), None);
        // Nothing left after stripping
        assert_eq!(mapper.to_base("USDT", Exchange::Bybit.into()), None);
        assert_eq!(mapper.to_base("", DataSource::CoinGecko), None);
    }

    #[test]
    fn test_cache_statistics() {
        let mapper = SymbolMapper::new();

        mapper.to_base("BTCUSDT", Exchange::Binance.into());
        mapper.to_base("BTCUSDT", Exchange::Binance.into());
        mapper.to_base("BTCUSDT", Exchange::Bybit.into());

        let (hits, misses, rate) = mapper.get_cache_stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 2);
        assert!((rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_coingecko_keeps_punctuated_tickers() {
        let mapper = SymbolMapper::new();

        assert_eq!(mapper.to_base("bsc-usd", DataSource::CoinGecko), Some(Symbol::new("BSC-USD")));
        assert_eq!(mapper.to_base("usd+", DataSource::CoinGecko), Some(Symbol::new("USD+")));
        assert_eq!(mapper.to_base("usdc.e", DataSource::CoinGecko), Some(Symbol::new("USDC.E")));
        assert_eq!(mapper.to_base("   ", DataSource::CoinGecko), None);
        // Exchange tickers still have to look like tickers
        assert_eq!(mapper.to_base("USD+USDT", Exchange::Binance.into()), None);
    }
}
