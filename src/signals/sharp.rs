//! Sharp-vs-retail divergence for player props.
//!
//! A reference ("sharp") book is assumed to price close to fair. When a
//! retail book hangs a different number, the line gap dominates: the side
//! whose number is easier to clear at retail is favoured. Otherwise, on
//! the same number, a retail price that pays more than the sharp's implied
//! probability is the edge.

use crate::aggregator::median_line;
use crate::config::EngineConfig;
use crate::odds::{format_american, implied_probability};
use crate::types::{EdgeSignal, MarketKey, MarketType, Quote, SignalKind, Side};

const SAME_LINE_EPS: f64 = 1e-9;

pub fn sharp_divergence(
    market: &MarketKey,
    current: &[&Quote],
    config: &EngineConfig,
) -> Vec<EdgeSignal> {
    if market.market_type != MarketType::PlayerProp {
        return Vec::new();
    }

    let (sharp, retail): (Vec<&Quote>, Vec<&Quote>) = current
        .iter()
        .copied()
        .partition(|q| config.is_sharp(&q.book_id));
    if sharp.is_empty() || retail.is_empty() {
        return Vec::new();
    }

    let sharp_lines: Vec<f64> = sharp.iter().filter_map(|q| q.line()).collect();
    let retail_lines: Vec<f64> = retail.iter().filter_map(|q| q.line()).collect();
    let (Some(sharp_line), Some(retail_line)) = (median_line(&sharp_lines), median_line(&retail_lines))
    else {
        return Vec::new();
    };

    let diff = retail_line - sharp_line;
    if diff.abs() >= config.prop_line_gap {
        // Lower retail number: over is easier. Higher: under is easier.
        let favored = if diff < 0.0 { Side::Over } else { Side::Under };
        let detail = format!(
            "retail line {retail_line} vs sharp {sharp_line}; {favored} easier to clear"
        );
        return vec![EdgeSignal::favoring(
            SignalKind::SharpDivergence,
            favored,
            diff.abs() * config.prop_line_scale,
            detail,
        )];
    }

    let (primary, secondary) = market.sides();
    [primary, secondary]
        .into_iter()
        .filter_map(|side| price_divergence(side, sharp_line, &sharp, &retail))
        .collect()
}

/// Same-number price comparison for one side.
fn price_divergence(
    side: Side,
    sharp_line: f64,
    sharp: &[&Quote],
    retail: &[&Quote],
) -> Option<EdgeSignal> {
    let on_line = |q: &&&Quote| {
        q.side == side && q.line().is_some_and(|l| (l - sharp_line).abs() < SAME_LINE_EPS)
    };
    let reference = sharp.iter().find(on_line)?;
    let sharp_prob = implied_probability(reference.price).ok()?;

    let mut best: Option<(&Quote, f64)> = None;
    for q in retail.iter().filter(on_line).copied() {
        let Ok(prob) = implied_probability(q.price) else {
            continue;
        };
        if best.map_or(true, |(_, p)| prob < p) {
            best = Some((q, prob));
        }
    }
    let (best_quote, retail_prob) = best?;

    let edge = (sharp_prob - retail_prob) * 100.0;
    if !edge.is_finite() || edge <= 0.0 {
        return None;
    }
    let detail = format!(
        "{} {side} {} vs {} {} on {sharp_line}",
        best_quote.book_id,
        format_american(best_quote.price),
        reference.book_id,
        format_american(reference.price),
    );
    Some(EdgeSignal::favoring(SignalKind::SharpDivergence, side, edge, detail))
}
