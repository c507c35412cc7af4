//! End-to-end scoring scenarios.
//!
//! Drives snapshots through the public API (source -> batch -> engine) and
//! checks the published edges.

use std::sync::Arc;

use ceq_engine::aggregator::{consensus, current_quotes};
use ceq_engine::config::{AppConfig, EngineConfig};
use ceq_engine::engine::batch::score_batch;
use ceq_engine::engine::periods::PeriodExpander;
use ceq_engine::engine::EdgeEngine;
use ceq_engine::scoring::{ScoreBlender, SideInputs};
use ceq_engine::signals::SignalSet;
use ceq_engine::source::SnapshotSource;
use ceq_engine::types::*;

use crate::mock_source::*;

#[test]
fn test_moved_spread_end_to_end() {
    let game = moved_spread_game("nba-bos-mia");

    let current = current_quotes(&game.quotes);
    let c = consensus(&current).unwrap();
    assert_eq!(c.line, Some(-2.75));
    assert_eq!(c.price, -108);
    assert_eq!(c.book_count, 2);

    let summary = EdgeEngine::default().score_game(&game);
    assert_eq!(summary.total_edge_count, 1);
    let edge = summary.best_edge.as_ref().unwrap();
    // Home went from laying 1.5 to laying 2.75: the away number improved.
    assert_eq!(edge.side, Side::Away);
    assert!((edge.edge_pct - 3.75).abs() < 1e-9);
    assert_eq!(edge.confidence, Some(61));
    assert_eq!(edge.tier, Tier::Mid);
    assert!(edge.rationale.starts_with("line_movement won"));
}

#[test]
fn test_pipeline_is_idempotent() {
    let engine = EdgeEngine::default();
    let mut game = moved_spread_game("g");
    game.quotes.extend([
        total("draftkings", Period::FullGame, Side::Over, 221.5, -110, 0),
        total("draftkings", Period::FullGame, Side::Over, 219.5, -110, 60),
        total("fanduel", Period::FullGame, Side::Under, 219.5, -108, 60),
    ]);
    let a = serde_json::to_string(&engine.score_game(&game)).unwrap();
    let b = serde_json::to_string(&engine.score_game(&game)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_sub_period_opening_is_labelled_as_estimate() {
    let cfg = EngineConfig::default();
    let history = vec![
        total("draftkings", Period::FullGame, Side::Over, 230.0, -110, 0),
        total("draftkings", Period::FullGame, Side::Over, 228.0, -110, 60),
    ];
    let q1 = MarketKey::new(MarketType::Total, Period::Q1);
    let opening = PeriodExpander::new(&cfg)
        .opening_for(&q1, &[], &history)
        .unwrap();
    // 230 * 0.25, never presented as observed.
    assert!(opening.estimated);
    assert!((opening.line - 57.5).abs() < 1e-9);
    assert!(opening.observed_at.is_none());

    let current = [
        total("draftkings", Period::Q1, Side::Over, 55.0, -110, 60),
        total("fanduel", Period::Q1, Side::Over, 55.0, -110, 60),
    ];
    let refs: Vec<&Quote> = current.iter().collect();
    let signals = SignalSet::new(&cfg).collect(&q1, &refs, Some(&opening));
    let score = ScoreBlender::new(&cfg).blend(
        &q1,
        &signals,
        SideInputs::quoted_at(-110),
        SideInputs::default(),
        None,
    );
    // Now 55: over by 2.5 * 1.5.
    assert!((score.primary.edge_pct - 3.75).abs() < 1e-9);
    assert!(score.primary.rationale.contains("approximation"));
    assert!(score.primary.is_edge);
}

#[test]
fn test_two_books_one_quote_each_moves_the_line() {
    let game = GameSnapshot::new(
        "nba-chi-det",
        vec![
            spread("draftkings", Period::FullGame, Side::Home, -1.5, -110, 0),
            spread("fanduel", Period::FullGame, Side::Home, -3.0, -110, 60),
        ],
    );
    let summary = EdgeEngine::default().score_game(&game);
    let market = &summary.markets[0];
    assert!(market
        .secondary
        .contributing_signals
        .iter()
        .any(|s| s.kind == SignalKind::LineMovement));
    assert_eq!(market.secondary.confidence, Some(58));
    assert_eq!(market.primary.confidence, Some(42));
    assert_eq!(summary.total_edge_count, 1);
}

#[test]
fn test_player_prop_against_sharp_book() {
    let game = GameSnapshot::new(
        "nba-bos-nyk",
        vec![
            points_prop("pinnacle", Side::Over, 24.5, -110, 0),
            points_prop("fanduel", Side::Over, 23.5, -115, 0),
            points_prop("draftkings", Side::Over, 23.5, -110, 0),
        ],
    );
    let summary = EdgeEngine::default().score_game(&game);
    assert_eq!(summary.markets.len(), 1);
    let edge = summary.best_edge.unwrap();
    assert_eq!(edge.side, Side::Over);
    assert_eq!(edge.market.prop.as_ref().unwrap().stat, "points");
    // One point under the sharp number: 1.0 * 3.0.
    assert!((edge.edge_pct - 3.0).abs() < 1e-9);
    assert_eq!(edge.confidence, Some(60));
    assert!(edge.rationale.starts_with("sharp_divergence won"));
    assert!(edge
        .contributing_signals
        .iter()
        .any(|s| s.kind == SignalKind::CrossBookDispersion));
}

#[test]
fn test_context_boost_in_pipeline() {
    let mut game = GameSnapshot::new(
        "nba-sac-ind",
        vec![
            total("draftkings", Period::FullGame, Side::Over, 240.0, -110, 0),
            total("draftkings", Period::FullGame, Side::Over, 238.0, -110, 60),
        ],
    );
    let plain = EdgeEngine::default().score_game(&game);
    game.composite_score = Some(64.0);
    let boosted = EdgeEngine::default().score_game(&game);

    let plain_over = &plain.markets[0].primary;
    let boosted_over = &boosted.markets[0].primary;
    assert!((plain_over.edge_pct - 3.0).abs() < 1e-9);
    assert!((boosted_over.edge_pct - 3.6).abs() < 1e-9);
    assert!(boosted_over.confidence > plain_over.confidence);
}

#[test]
fn test_invalid_odds_do_not_abort_batch() {
    let mut broken = moved_spread_game("broken");
    broken
        .quotes
        .push(quote("fanduel", Market::Moneyline, Period::FullGame, Side::Home, 0, 95));
    let games = vec![moved_spread_game("ok-1"), broken, moved_spread_game("ok-2")];

    let (summaries, report) =
        tokio_test::block_on(score_batch(Arc::new(EdgeEngine::default()), games));
    assert_eq!(summaries.len(), 3);
    assert_eq!(report.games_scored, 3);
    assert_eq!(report.rejected_quotes, 1);
    assert_eq!(report.edges_found, 3);
    assert_eq!(summaries[1].rejected_quotes, 1);
    assert_eq!(summaries[1].total_edge_count, 1);
}

#[test]
fn test_missing_side_is_unset_not_error() {
    let game = GameSnapshot::new(
        "nhl-tor-mtl",
        vec![quote("draftkings", Market::Moneyline, Period::P1, Side::Home, -120, 0)],
    );
    let summary = EdgeEngine::default().score_game(&game);
    let market = &summary.markets[0];
    assert_eq!(market.primary.confidence, Some(50));
    assert_eq!(market.secondary.confidence, None);
    assert_eq!(summary.total_edge_count, 0);
}

#[test]
fn test_stricter_threshold_from_config() {
    let cfg = AppConfig::parse("[engine]\npublish_threshold = 62").unwrap();
    let engine = EdgeEngine::new(cfg.engine);
    let summary = engine.score_game(&moved_spread_game("g"));
    // 61 no longer clears the bar.
    assert_eq!(summary.total_edge_count, 0);
    assert!(summary.markets[0]
        .secondary
        .rationale
        .contains("below publish threshold 62"));
    assert_eq!(engine.config().publish_threshold, 62);
    assert_ne!(engine.config(), &EngineConfig::default());
}

#[test]
fn test_source_to_batch() {
    let source = MockSource::new(vec![moved_spread_game("a"), moved_spread_game("b")]);
    let (summaries, report) = tokio_test::block_on(async {
        let games = source.fetch_games().await.unwrap();
        score_batch(Arc::new(EdgeEngine::default()), games).await
    });
    assert_eq!(source.fetch_count(), 1);
    assert_eq!(summaries.len(), 2);
    assert_eq!(report.best_game_id.as_deref(), Some("a"));
}

#[test]
fn test_source_failure_surfaces() {
    let source = MockSource::new(Vec::new());
    source.set_error("feed timeout");
    let err = tokio_test::block_on(source.fetch_games()).unwrap_err();
    assert!(err.to_string().contains("feed timeout"));
}
