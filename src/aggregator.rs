//! Consensus building.
//!
//! Collapses per-book quotes into one consensus quote per outcome (median
//! with tie-break) and reduces time-ordered quotes to an opening line.
//! This is the single place consensus is computed; every caller goes
//! through it.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::types::{ConsensusQuote, MarketKey, MarketType, OpeningReference, Quote, QuoteKey, Side};

// ---------------------------------------------------------------------------
// Medians
// ---------------------------------------------------------------------------

/// Median of line values. Even counts return the plain midpoint, unrounded.
pub fn median_line(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Median of American prices. Even counts return the midpoint rounded to
/// the nearest integer (halves away from zero), since prices are integral.
pub fn median_price(values: &[i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        let sum = i64::from(sorted[mid - 1]) + i64::from(sorted[mid]);
        Some((sum as f64 / 2.0).round() as i32)
    }
}

// ---------------------------------------------------------------------------
// Consensus
// ---------------------------------------------------------------------------

/// Consensus for one outcome. The outcome is taken from the first quote;
/// quotes for other outcomes are ignored. `None` on empty input.
pub fn consensus(quotes: &[Quote]) -> Option<ConsensusQuote> {
    let key = quotes.first()?.key();
    let members: Vec<&Quote> = quotes.iter().filter(|q| q.key() == key).collect();
    consensus_of(key, &members)
}

/// Consensus for every outcome present, keyed by (market, period, side).
pub fn group_consensus(quotes: &[Quote]) -> BTreeMap<QuoteKey, ConsensusQuote> {
    let mut groups: BTreeMap<QuoteKey, Vec<&Quote>> = BTreeMap::new();
    for q in quotes {
        groups.entry(q.key()).or_default().push(q);
    }
    groups
        .into_iter()
        .filter_map(|(key, members)| {
            consensus_of(key.clone(), &members).map(|c| (key, c))
        })
        .collect()
}

fn consensus_of(key: QuoteKey, members: &[&Quote]) -> Option<ConsensusQuote> {
    let prices: Vec<i32> = members.iter().map(|q| q.price).collect();
    let price = median_price(&prices)?;
    let lines: Vec<f64> = members.iter().filter_map(|q| q.line()).collect();
    Some(ConsensusQuote {
        key,
        line: median_line(&lines),
        price,
        book_count: members.len(),
    })
}

/// The latest quote per (book, outcome). On an `observed_at` tie the
/// later-inserted quote wins. Output keeps first-seen order.
pub fn current_quotes(quotes: &[Quote]) -> Vec<Quote> {
    let mut index: HashMap<(String, QuoteKey), usize> = HashMap::new();
    let mut latest: Vec<Quote> = Vec::new();
    for q in quotes {
        let slot = (q.book_id.clone(), q.key());
        match index.get(&slot) {
            Some(&i) => {
                if q.observed_at >= latest[i].observed_at {
                    latest[i] = q.clone();
                }
            }
            None => {
                index.insert(slot, latest.len());
                latest.push(q.clone());
            }
        }
    }
    latest
}

/// Most frequently quoted line; ties go to the first one seen.
pub fn main_line(quotes: &[&Quote]) -> Option<f64> {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for line in quotes.iter().filter_map(|q| q.line()) {
        match counts.iter_mut().find(|(l, _)| *l == line) {
            Some((_, n)) => *n += 1,
            None => counts.push((line, 1)),
        }
    }
    let mut best: Option<(f64, usize)> = None;
    for (line, n) in counts {
        if best.map_or(true, |(_, m)| n > m) {
            best = Some((line, n));
        }
    }
    best.map(|(line, _)| line)
}

// ---------------------------------------------------------------------------
// Opening reference
// ---------------------------------------------------------------------------

/// First line in time order. Quotes are stably sorted by `observed_at`, so
/// a timestamp tie goes to the first-seen quote. `None` if no quote has a line.
pub fn opening_reference(quotes: &[Quote]) -> Option<f64> {
    earliest_line(quotes.iter(), Quote::line).map(|(line, _)| line)
}

/// A spread line restated from the home side's perspective; other line
/// markets are side-independent.
pub fn home_perspective_line(quote: &Quote) -> Option<f64> {
    let line = quote.line()?;
    match (quote.market.kind(), quote.side) {
        (MarketType::Spread, Side::Away) => Some(-line),
        _ => Some(line),
    }
}

/// Opening reference for one market across all books and sides: the
/// earliest home-perspective line. Moneylines have no line and therefore
/// no opening.
pub fn opening_for_market(market: &MarketKey, quotes: &[Quote]) -> Option<OpeningReference> {
    let members = quotes.iter().filter(|q| &q.market_key() == market);
    let (line, observed_at) = earliest_line(members, home_perspective_line)?;
    Some(OpeningReference {
        market: market.clone(),
        line,
        observed_at: Some(observed_at),
        estimated: false,
    })
}

fn earliest_line<'a>(
    quotes: impl Iterator<Item = &'a Quote>,
    line_of: impl Fn(&Quote) -> Option<f64>,
) -> Option<(f64, DateTime<Utc>)> {
    let mut ordered: Vec<&Quote> = quotes.collect();
    ordered.sort_by_key(|q| q.observed_at);
    ordered
        .into_iter()
        .find_map(|q| line_of(q).map(|line| (line, q.observed_at)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
