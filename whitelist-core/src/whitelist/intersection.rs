use super::IntersectionRecord;
use crate::exchanges::Exchange;
use crate::market_data::RankingTable;
use tracing::debug;

/// Symbols inside both the market cap top `market_cap_top_k` and the volume
/// top `volume_top_k` of one exchange, ascending by market cap rank.
///
/// An empty table on either side gives an empty result; that is how an
/// unavailable exchange shows up, not an error.
pub fn intersect(
    market_caps: &RankingTable,
    volumes: &RankingTable,
    market_cap_top_k: u32,
    volume_top_k: u32,
    exchange: Exchange,
) -> Vec<IntersectionRecord> {
    let by_market_cap = market_caps.top(market_cap_top_k);
    let by_volume = volumes.top(volume_top_k);

    let mut records: Vec<IntersectionRecord> = by_market_cap
        .intersection(&by_volume)
        .filter_map(|symbol| {
            let cap = market_caps.get(symbol)?;
            let volume = volumes.get(symbol)?;
            Some(IntersectionRecord {
                symbol: symbol.pair(),
                base_symbol: (*symbol).clone(),
                market_cap_rank: cap.rank,
                volume_rank: volume.rank,
                market_cap: cap.metric_value,
                volume_24h: volume.metric_value,
                source_exchange: exchange,
            })
        })
        .collect();

    records.sort_by(|a, b| {
        a.market_cap_rank
            .cmp(&b.market_cap_rank)
            .then_with(|| a.base_symbol.cmp(&b.base_symbol))
    });

    debug!(
        "{}: {} of market cap top {} ∩ volume top {}",
        exchange,
        records.len(),
        market_cap_top_k,
        volume_top_k
    );
    records
}
