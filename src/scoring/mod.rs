//! Score blending.
//!
//! Turns the signals of one two-way market into a pair of side scores.
//! Each side takes its single strongest favouring signal (max-pick, not an
//! average), optionally boosted by the context modifier, and maps it to a
//! confidence and tier. At most one side is then published as the edge.

pub mod confidence;

use std::cmp::Ordering;

use tracing::debug;

use crate::config::EngineConfig;
use crate::odds::two_way_expected_value;
use crate::signals::ContextBoost;
use crate::types::{EdgeSignal, MarketKey, MarketScore, Side, SideScore, SignalKind, Tier};

/// What the blender needs to know about one side besides its signals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideInputs {
    /// Consensus price of the side, used for the EV gate.
    pub price: Option<i32>,
    /// Whether any book currently quotes the side.
    pub quoted: bool,
}

impl SideInputs {
    pub fn quoted_at(price: i32) -> Self {
        Self {
            price: Some(price),
            quoted: true,
        }
    }
}

/// The winning signal of one side.
struct SidePick {
    winner: EdgeSignal,
    /// Context-adjusted magnitude.
    pct: f64,
    contributing: Vec<EdgeSignal>,
    boosted: bool,
}

pub struct ScoreBlender<'a> {
    config: &'a EngineConfig,
}

impl<'a> ScoreBlender<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Score both sides of `market` and flag at most one as the edge.
    pub fn blend(
        &self,
        market: &MarketKey,
        signals: &[EdgeSignal],
        primary: SideInputs,
        secondary: SideInputs,
        boost: Option<&ContextBoost>,
    ) -> MarketScore {
        let (primary_side, secondary_side) = market.sides();
        let primary_pick = pick(market, primary_side, signals, boost);
        let secondary_pick = pick(market, secondary_side, signals, boost);

        let mut primary_score = match &primary_pick {
            Some(p) => picked(market, primary_side, p),
            None => unpicked(
                market,
                primary_side,
                primary.quoted,
                secondary_pick.as_ref().map(|p| confidence::confidence(p.pct)),
            ),
        };
        let mut secondary_score = match &secondary_pick {
            Some(p) => picked(market, secondary_side, p),
            None => unpicked(
                market,
                secondary_side,
                secondary.quoted,
                primary_pick.as_ref().map(|p| confidence::confidence(p.pct)),
            ),
        };

        primary_score.expected_value = two_way_expected_value(primary.price, secondary.price);
        secondary_score.expected_value = two_way_expected_value(secondary.price, primary.price);

        let candidate = match primary_score
            .confidence_or_zero()
            .cmp(&secondary_score.confidence_or_zero())
        {
            Ordering::Greater => Some(&mut primary_score),
            Ordering::Less => Some(&mut secondary_score),
            Ordering::Equal => {
                if !primary_score.contributing_signals.is_empty() {
                    for s in [&mut primary_score, &mut secondary_score] {
                        s.rationale.push_str("; tied with opposite side, no edge");
                    }
                }
                None
            }
        };
        if let Some(side) = candidate {
            self.publish(side);
        }

        MarketScore {
            market: market.clone(),
            primary: primary_score,
            secondary: secondary_score,
        }
    }

    /// Apply the publish threshold and EV gate to the stronger side.
    fn publish(&self, score: &mut SideScore) {
        if score.contributing_signals.is_empty() {
            return;
        }
        let threshold = self.config.publish_threshold;
        let conf = score.confidence_or_zero();
        if conf < threshold {
            score
                .rationale
                .push_str(&format!("; below publish threshold {threshold}"));
            return;
        }
        if let Some(ev) = score.expected_value.filter(|ev| *ev < 0.0) {
            debug!(
                market = %score.market,
                side = %score.side,
                confidence = conf,
                ev = %format!("{ev:.4}"),
                "Edge suppressed by negative EV"
            );
            score
                .rationale
                .push_str(&format!("; suppressed: negative EV {ev:.4}"));
            return;
        }
        score.is_edge = true;
        score.rationale.push_str("; published");
        debug!(
            market = %score.market,
            side = %score.side,
            confidence = conf,
            tier = %score.tier,
            "Edge published"
        );
    }
}

/// Strongest favouring signal of `side`; ties go to the first signal.
fn pick(
    market: &MarketKey,
    side: Side,
    signals: &[EdgeSignal],
    boost: Option<&ContextBoost>,
) -> Option<SidePick> {
    let favouring: Vec<&EdgeSignal> = signals
        .iter()
        .filter(|s| s.kind != SignalKind::ContextModifier && s.favors(market) == Some(side))
        .collect();

    let mut best: Option<&EdgeSignal> = None;
    for s in favouring.iter().copied() {
        if best.map_or(true, |b| s.strength() > b.strength()) {
            best = Some(s);
        }
    }
    let winner = best?.clone();

    let mut contributing: Vec<EdgeSignal> = favouring.into_iter().cloned().collect();
    let base = winner.strength();
    let (pct, boosted) = match boost.and_then(|b| b.apply(side, base)) {
        Some((boosted, modifier)) => {
            contributing.push(modifier);
            (boosted, true)
        }
        None => (base, false),
    };

    Some(SidePick {
        winner,
        pct,
        contributing,
        boosted,
    })
}

fn picked(market: &MarketKey, side: Side, pick: &SidePick) -> SideScore {
    let conf = confidence::confidence(pick.pct);
    let tier = confidence::tier(pick.pct);
    let mut rationale = format!(
        "{} won at {:.2}% ({})",
        pick.winner.kind,
        pick.winner.strength(),
        pick.winner.detail
    );
    if pick.boosted {
        rationale.push_str(&format!("; context-adjusted to {:.2}%", pick.pct));
    }
    let others = pick
        .contributing
        .iter()
        .filter(|s| s.kind != SignalKind::ContextModifier)
        .count()
        - 1;
    if others > 0 {
        rationale.push_str(&format!("; {others} weaker signal(s) ignored"));
    }
    rationale.push_str(&format!(" -> CEQ {conf} {tier}"));

    SideScore {
        market: market.clone(),
        side,
        confidence: Some(conf),
        tier,
        edge_pct: pick.pct,
        is_edge: false,
        expected_value: None,
        contributing_signals: pick.contributing.clone(),
        rationale,
    }
}

/// A side without a favouring signal mirrors the opposite side around 50.
/// Without quotes it stays unset.
fn unpicked(market: &MarketKey, side: Side, quoted: bool, opposite: Option<u8>) -> SideScore {
    let mut score = SideScore::unset(market.clone(), side);
    if !quoted {
        score.rationale = "no quotes and no favouring signal".to_string();
        return score;
    }
    match opposite {
        Some(c) => {
            score.confidence = Some(100u8.saturating_sub(c));
            score.rationale = format!("no favouring signal; mirrors {} CEQ {c}", side.opposite());
        }
        None => {
            score.confidence = Some(confidence::NEUTRAL_CONFIDENCE);
            score.rationale = "no signal".to_string();
        }
    }
    score.tier = Tier::NoEdge;
    score
}
