//! In-memory snapshot source for integration testing.
//!
//! Returns a fixed set of games, counts fetches, and can be told to fail,
//! all without touching disk.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use ceq_engine::source::SnapshotSource;
use ceq_engine::types::*;

pub struct MockSource {
    games: Vec<GameSnapshot>,
    fetches: Arc<Mutex<usize>>,
    /// If set, every fetch returns this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockSource {
    pub fn new(games: Vec<GameSnapshot>) -> Self {
        Self {
            games,
            fetches: Arc::new(Mutex::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl SnapshotSource for MockSource {
    async fn fetch_games(&self) -> Result<Vec<GameSnapshot>> {
        *self.fetches.lock().unwrap() += 1;
        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        Ok(self.games.clone())
    }
}

// ---------------------------------------------------------------------------
// Quote builders
// ---------------------------------------------------------------------------

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 3, 23, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn quote(book: &str, market: Market, period: Period, side: Side, price: i32, minutes: i64) -> Quote {
    Quote {
        book_id: book.to_string(),
        market,
        period,
        side,
        price,
        observed_at: at(minutes),
    }
}

pub fn spread(book: &str, period: Period, side: Side, line: f64, price: i32, minutes: i64) -> Quote {
    quote(book, Market::Spread { line }, period, side, price, minutes)
}

pub fn total(book: &str, period: Period, side: Side, line: f64, price: i32, minutes: i64) -> Quote {
    quote(book, Market::Total { line }, period, side, price, minutes)
}

pub fn points_prop(book: &str, side: Side, line: f64, price: i32, minutes: i64) -> Quote {
    quote(
        book,
        Market::PlayerProp {
            player: "J. Tatum".to_string(),
            stat: "points".to_string(),
            line,
        },
        Period::FullGame,
        side,
        price,
        minutes,
    )
}

/// Spread opened at home -1.5 and moved to -3 / -2.5 across two books.
pub fn moved_spread_game(game_id: &str) -> GameSnapshot {
    GameSnapshot::new(
        game_id,
        vec![
            spread("draftkings", Period::FullGame, Side::Home, -1.5, -110, 0),
            spread("draftkings", Period::FullGame, Side::Home, -3.0, -110, 90),
            spread("fanduel", Period::FullGame, Side::Home, -2.5, -105, 95),
        ],
    )
}
