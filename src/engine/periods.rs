//! Period expansion.
//!
//! Every period is scored independently: quotes are split by period and
//! market, each market gets its signals, and the blender scores both
//! sides. Periods with no quotes are skipped.

use std::collections::BTreeMap;

use tracing::debug;

use crate::aggregator::{current_quotes, group_consensus, opening_for_market};
use crate::config::EngineConfig;
use crate::scoring::{ScoreBlender, SideInputs};
use crate::signals::{ContextBoost, SignalSet};
use crate::types::{
    GameSnapshot, MarketKey, MarketScore, OpeningReference, Period, PeriodSegment, Quote, QuoteKey,
};

pub struct PeriodExpander<'a> {
    config: &'a EngineConfig,
}

impl<'a> PeriodExpander<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Score every period of `snapshot` using the already validated
    /// `quotes`. Output is in period order, then market order.
    pub fn expand(&self, snapshot: &GameSnapshot, quotes: &[Quote]) -> Vec<MarketScore> {
        let boost = ContextBoost::from_composite(
            snapshot.composite_score,
            &snapshot.context,
            &self.config.context,
        );
        let openings: Vec<&OpeningReference> = snapshot
            .openings
            .iter()
            .filter(|o| o.line.is_finite())
            .collect();

        let mut scores = Vec::new();
        for period in Period::ALL.iter().copied() {
            let in_period: Vec<Quote> = quotes
                .iter()
                .filter(|q| q.period == period)
                .cloned()
                .collect();
            if in_period.is_empty() {
                debug!(game_id = %snapshot.game_id, period = %period, "No quotes, skipping period");
                continue;
            }
            scores.extend(self.score_period(&in_period, quotes, &openings, boost.as_ref()));
        }
        scores
    }

    /// Score all markets of one period. `history` is the full quote list of
    /// the game, used for openings.
    fn score_period(
        &self,
        in_period: &[Quote],
        history: &[Quote],
        openings: &[&OpeningReference],
        boost: Option<&ContextBoost>,
    ) -> Vec<MarketScore> {
        let mut markets: BTreeMap<MarketKey, Vec<Quote>> = BTreeMap::new();
        for q in current_quotes(in_period) {
            markets.entry(q.market_key()).or_default().push(q);
        }

        let signal_set = SignalSet::new(self.config);
        let blender = ScoreBlender::new(self.config);

        markets
            .into_iter()
            .map(|(market, current)| {
                let opening = self.opening_for(&market, openings, history);
                let refs: Vec<&Quote> = current.iter().collect();
                let signals = signal_set.collect(&market, &refs, opening.as_ref());

                let consensus = group_consensus(&current);
                let (primary, secondary) = market.sides();
                let inputs = |side| {
                    let key = QuoteKey {
                        market: market.clone(),
                        side,
                    };
                    SideInputs {
                        price: consensus.get(&key).map(|c| c.price),
                        quoted: current.iter().any(|q| q.side == side),
                    }
                };

                blender.blend(&market, &signals, inputs(primary), inputs(secondary), boost)
            })
            .collect()
    }

    /// Opening for `market`: an explicit opening, else the first observed
    /// line, else (sub-periods with no line of their own) the full-game
    /// opening prorated.
    pub fn opening_for(
        &self,
        market: &MarketKey,
        openings: &[&OpeningReference],
        history: &[Quote],
    ) -> Option<OpeningReference> {
        if let Some(found) = observed_opening(market, openings, history) {
            return Some(found);
        }

        let fraction = self.proration(market.period)?;
        let full_game = MarketKey {
            period: Period::FullGame,
            ..market.clone()
        };
        let base = observed_opening(&full_game, openings, history)?;
        debug!(
            market = %market,
            full_game_line = base.line,
            fraction,
            "Estimating sub-period opening"
        );
        Some(OpeningReference {
            market: market.clone(),
            line: base.line * fraction,
            observed_at: None,
            estimated: true,
        })
    }

    /// Fraction of the full-game line a sub-period opening is estimated at.
    /// `None` for the full game and team totals, which are never prorated.
    pub fn proration(&self, period: Period) -> Option<f64> {
        match period.segment() {
            PeriodSegment::Half => Some(self.config.half_fraction),
            PeriodSegment::Quarter => Some(self.config.quarter_fraction),
            PeriodSegment::PeriodOfPlay => Some(self.config.period_fraction),
            PeriodSegment::Full | PeriodSegment::TeamTotal => None,
        }
    }
}

/// An explicit opening, else the earliest line quoted for the market by
/// any book.
fn observed_opening(
    market: &MarketKey,
    openings: &[&OpeningReference],
    history: &[Quote],
) -> Option<OpeningReference> {
    openings
        .iter()
        .find(|o| &o.market == market)
        .map(|o| (*o).clone())
        .or_else(|| opening_for_market(market, history))
}
