//! Cross-book dispersion ("sharp-book index").
//!
//! When one retail book's price beats the consensus for the same outcome
//! by a material margin, the gap (in implied-probability percentage
//! points) is an edge on that outcome. Prices are only compared on the
//! most commonly quoted line.

use crate::aggregator::{main_line, median_price};
use crate::config::EngineConfig;
use crate::odds::{format_american, implied_probability};
use crate::types::{EdgeSignal, Quote, SignalKind, Side};

pub fn dispersion(
    side: Side,
    current: &[&Quote],
    config: &EngineConfig,
) -> Option<EdgeSignal> {
    let side_quotes: Vec<&Quote> = current.iter().copied().filter(|q| q.side == side).collect();
    let comparable: Vec<&Quote> = match main_line(&side_quotes) {
        Some(line) => side_quotes
            .into_iter()
            .filter(|q| q.line() == Some(line))
            .collect(),
        None => side_quotes,
    };
    if comparable.len() < 2 {
        return None;
    }

    let prices: Vec<i32> = comparable.iter().map(|q| q.price).collect();
    let consensus = median_price(&prices)?;
    let consensus_prob = implied_probability(consensus).ok()?;

    let mut best: Option<(&Quote, f64)> = None;
    for q in comparable.iter().copied().filter(|q| !config.is_sharp(&q.book_id)) {
        let Ok(prob) = implied_probability(q.price) else {
            continue;
        };
        if best.map_or(true, |(_, p)| prob < p) {
            best = Some((q, prob));
        }
    }
    let (best_quote, best_prob) = best?;

    let gap = (consensus_prob - best_prob) * 100.0;
    if !gap.is_finite() || gap <= 0.0 || gap < config.dispersion_min_pct {
        return None;
    }

    let detail = format!(
        "{} {} {} vs consensus {} across {} books",
        best_quote.book_id,
        side,
        format_american(best_quote.price),
        format_american(consensus),
        comparable.len(),
    );
    Some(EdgeSignal::favoring(SignalKind::CrossBookDispersion, side, gap, detail))
}
