use super::{IntersectionRecord, MergedEntry};
use crate::exchanges::Exchange;
use std::collections::HashMap;
use tracing::trace;

/// What `upsert` did with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// First time the symbol was seen; the record defines the entry
    Created,
    /// Symbol already present; only the exchange was recorded
    Appended,
}

/// Insert a record, or add its exchange to the entry that already holds the
/// symbol. Fields of an existing entry are never overwritten.
pub fn upsert(
    entries: &mut HashMap<String, MergedEntry>,
    exchange: Exchange,
    record: IntersectionRecord,
) -> Upsert {
    match entries.get_mut(&record.symbol) {
        Some(entry) => {
            if !entry.exchanges.contains(&exchange) {
                entry.exchanges.push(exchange);
            }
            Upsert::Appended
        }
        None => {
            entries.insert(record.symbol.clone(), MergedEntry::from_record(record, exchange));
            Upsert::Created
        }
    }
}

/// Union per-exchange intersections into one list, ascending by market cap
/// rank with the base symbol breaking ties.
///
/// Lists are consumed in the order given; that order is what ends up in each
/// entry's `exchanges`.
pub fn merge<I>(results: I) -> Vec<MergedEntry>
where
    I: IntoIterator<Item = (Exchange, Vec<IntersectionRecord>)>,
{
    let entries = results
        .into_iter()
        .flat_map(|(exchange, records)| records.into_iter().map(move |record| (exchange, record)))
        .fold(HashMap::new(), |mut acc, (exchange, record)| {
            let symbol = record.symbol.clone();
            let outcome = upsert(&mut acc, exchange, record);
            trace!("{} from {}: {:?}", symbol, exchange, outcome);
            acc
        });

    let mut merged: Vec<MergedEntry> = entries.into_values().collect();
    merged.sort_by(|a, b| {
        a.record
            .market_cap_rank
            .cmp(&b.record.market_cap_rank)
            .then_with(|| a.record.base_symbol.cmp(&b.record.base_symbol))
    });
    merged
}
