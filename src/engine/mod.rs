//! Scoring engine: one game snapshot in, one edge summary out.
//!
//! Scoring is synchronous and side-effect free. Batches of games are
//! fanned out by [`batch::score_batch`].

pub mod batch;
pub mod periods;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::types::{GameEdgeSummary, GameSnapshot, MarketScore, Quote, SideScore};

use periods::PeriodExpander;

#[derive(Debug, Clone, Default)]
pub struct EdgeEngine {
    config: EngineConfig,
}

impl EdgeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score every period and market of one game.
    ///
    /// Invalid quotes are dropped and counted; they never abort the game.
    pub fn score_game(&self, snapshot: &GameSnapshot) -> GameEdgeSummary {
        let (quotes, rejected) = ingest(snapshot);
        let markets = PeriodExpander::new(&self.config).expand(snapshot, &quotes);
        let summary = summarize(&snapshot.game_id, markets, rejected);
        debug!(
            game_id = %summary.game_id,
            home = %snapshot.home_team,
            away = %snapshot.away_team,
            markets = summary.markets.len(),
            edges = summary.total_edge_count,
            rejected = summary.rejected_quotes,
            "Game scored"
        );
        summary
    }
}

/// Split the snapshot's quotes into valid ones and a rejected count.
fn ingest(snapshot: &GameSnapshot) -> (Vec<Quote>, usize) {
    let mut valid = Vec::with_capacity(snapshot.quotes.len());
    let mut rejected = 0;
    for q in &snapshot.quotes {
        match q.validate() {
            Ok(()) => valid.push(q.clone()),
            Err(e) => {
                warn!(
                    game_id = %snapshot.game_id,
                    book = %q.book_id,
                    error = %e,
                    "Rejected quote"
                );
                rejected += 1;
            }
        }
    }
    (valid, rejected)
}

/// Count published edges and pick the headline one. Confidence ties go to
/// the edge seen first in period/market order.
fn summarize(game_id: &str, markets: Vec<MarketScore>, rejected: usize) -> GameEdgeSummary {
    let mut summary = GameEdgeSummary::empty(game_id);
    summary.markets = markets;
    summary.rejected_quotes = rejected;

    let mut best_edge: Option<&SideScore> = None;
    for edge in summary.edges() {
        if best_edge.map_or(true, |b| edge.confidence_or_zero() > b.confidence_or_zero()) {
            best_edge = Some(edge);
        }
    }
    let best_edge = best_edge.cloned();

    summary.total_edge_count = summary.edges().count();
    summary.best_edge = best_edge;
    summary
}
