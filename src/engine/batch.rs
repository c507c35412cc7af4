//! Fork-join scoring of many games.
//!
//! Games are independent, so each one is scored on the blocking pool and
//! the results are joined. A game whose task fails is logged and left out
//! of the batch; its siblings are unaffected.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::engine::EdgeEngine;
use crate::types::{GameEdgeSummary, GameSnapshot, SideScore};

/// Roll-up of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub games_scored: usize,
    pub games_failed: usize,
    pub markets_scored: usize,
    pub edges_found: usize,
    pub rejected_quotes: usize,
    /// Game of the highest-confidence edge in the batch.
    pub best_game_id: Option<String>,
    pub best_edge: Option<SideScore>,
}

impl BatchReport {
    /// Fold one game into the report. Confidence ties keep the earlier game.
    pub fn record(&mut self, summary: &GameEdgeSummary) {
        self.games_scored += 1;
        self.markets_scored += summary.markets.len();
        self.edges_found += summary.total_edge_count;
        self.rejected_quotes += summary.rejected_quotes;

        if let Some(edge) = &summary.best_edge {
            let current = self.best_edge.as_ref().map_or(0, |b| b.confidence_or_zero());
            if self.best_edge.is_none() || edge.confidence_or_zero() > current {
                self.best_game_id = Some(summary.game_id.clone());
                self.best_edge = Some(edge.clone());
            }
        }
    }

    pub fn from_summaries(summaries: &[GameEdgeSummary]) -> Self {
        let mut report = Self::default();
        for s in summaries {
            report.record(s);
        }
        report
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "games={} failed={} markets={} edges={} rejected={}",
            self.games_scored,
            self.games_failed,
            self.markets_scored,
            self.edges_found,
            self.rejected_quotes,
        )?;
        if let (Some(game), Some(edge)) = (&self.best_game_id, &self.best_edge) {
            write!(f, " best=[{game}: {edge}]")?;
        }
        Ok(())
    }
}

/// Score `games` concurrently. Summaries come back in input order.
pub async fn score_batch(
    engine: Arc<EdgeEngine>,
    games: Vec<GameSnapshot>,
) -> (Vec<GameEdgeSummary>, BatchReport) {
    let handles: Vec<_> = games
        .into_iter()
        .map(|game| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || engine.score_game(&game))
        })
        .collect();

    let results = futures::future::join_all(handles).await;

    let mut summaries = Vec::with_capacity(results.len());
    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(summary) => {
                report.record(&summary);
                summaries.push(summary);
            }
            Err(e) => {
                error!(error = %e, "Scoring task failed");
                report.games_failed += 1;
            }
        }
    }

    info!(
        games = report.games_scored,
        failed = report.games_failed,
        edges = report.edges_found,
        rejected = report.rejected_quotes,
        "Batch scored"
    );
    (summaries, report)
}
