//! Shared types for the CEQ engine.
//!
//! These types form the data model used across all modules. Inputs
//! (`Quote`, `OpeningReference`, `GameSnapshot`) are immutable once built;
//! outputs (`SideScore`, `MarketScore`, `GameEdgeSummary`) are recomputed
//! from scratch on every scoring request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Market family, without the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Moneyline,
    Spread,
    Total,
    TeamTotal,
    PlayerProp,
}

impl MarketType {
    /// Spreads and moneylines are home/away markets; the rest are over/under.
    pub fn sides(&self) -> (Side, Side) {
        match self {
            MarketType::Moneyline | MarketType::Spread => (Side::Home, Side::Away),
            MarketType::Total | MarketType::TeamTotal | MarketType::PlayerProp => {
                (Side::Over, Side::Under)
            }
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Moneyline => write!(f, "moneyline"),
            MarketType::Spread => write!(f, "spread"),
            MarketType::Total => write!(f, "total"),
            MarketType::TeamTotal => write!(f, "team_total"),
            MarketType::PlayerProp => write!(f, "player_prop"),
        }
    }
}

impl std::str::FromStr for MarketType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "moneyline" | "ml" | "h2h" => Ok(MarketType::Moneyline),
            "spread" | "spreads" | "handicap" => Ok(MarketType::Spread),
            "total" | "totals" => Ok(MarketType::Total),
            "team_total" | "team_totals" => Ok(MarketType::TeamTotal),
            "player_prop" | "prop" | "props" => Ok(MarketType::PlayerProp),
            _ => Err(anyhow::anyhow!("Unknown market type: {s}")),
        }
    }
}

/// Scoring period. Each period is scored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    FullGame,
    FirstHalf,
    SecondHalf,
    Q1,
    Q2,
    Q3,
    Q4,
    P1,
    P2,
    P3,
    TeamTotalsHome,
    TeamTotalsAway,
}

/// How a period relates to the full game, for opening-line proration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSegment {
    Full,
    Half,
    Quarter,
    PeriodOfPlay,
    TeamTotal,
}

impl Period {
    /// Every period in scoring order.
    pub const ALL: &'static [Period] = &[
        Period::FullGame,
        Period::FirstHalf,
        Period::SecondHalf,
        Period::Q1,
        Period::Q2,
        Period::Q3,
        Period::Q4,
        Period::P1,
        Period::P2,
        Period::P3,
        Period::TeamTotalsHome,
        Period::TeamTotalsAway,
    ];

    pub fn segment(&self) -> PeriodSegment {
        match self {
            Period::FullGame => PeriodSegment::Full,
            Period::FirstHalf | Period::SecondHalf => PeriodSegment::Half,
            Period::Q1 | Period::Q2 | Period::Q3 | Period::Q4 => PeriodSegment::Quarter,
            Period::P1 | Period::P2 | Period::P3 => PeriodSegment::PeriodOfPlay,
            Period::TeamTotalsHome | Period::TeamTotalsAway => PeriodSegment::TeamTotal,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::FullGame => "full_game",
            Period::FirstHalf => "1H",
            Period::SecondHalf => "2H",
            Period::Q1 => "Q1",
            Period::Q2 => "Q2",
            Period::Q3 => "Q3",
            Period::Q4 => "Q4",
            Period::P1 => "P1",
            Period::P2 => "P2",
            Period::P3 => "P3",
            Period::TeamTotalsHome => "team_total_home",
            Period::TeamTotalsAway => "team_total_away",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full_game" | "full" | "game" => Ok(Period::FullGame),
            "first_half" | "1h" | "h1" => Ok(Period::FirstHalf),
            "second_half" | "2h" | "h2" => Ok(Period::SecondHalf),
            "q1" => Ok(Period::Q1),
            "q2" => Ok(Period::Q2),
            "q3" => Ok(Period::Q3),
            "q4" => Ok(Period::Q4),
            "p1" => Ok(Period::P1),
            "p2" => Ok(Period::P2),
            "p3" => Ok(Period::P3),
            "team_totals_home" | "team_total_home" => Ok(Period::TeamTotalsHome),
            "team_totals_away" | "team_total_away" => Ok(Period::TeamTotalsAway),
            _ => Err(anyhow::anyhow!("Unknown period: {s}")),
        }
    }
}

/// Outcome side of a two-way market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
    Over,
    Under,
}

impl Side {
    /// The opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
            Side::Over => Side::Under,
            Side::Under => Side::Over,
        }
    }

    /// Home and Over are the primary sides: positive signal magnitudes favour them.
    pub fn is_primary(&self) -> bool {
        matches!(self, Side::Home | Side::Over)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Home => write!(f, "HOME"),
            Side::Away => write!(f, "AWAY"),
            Side::Over => write!(f, "OVER"),
            Side::Under => write!(f, "UNDER"),
        }
    }
}

/// Discrete edge bucket used for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    NoEdge,
    Low,
    Mid,
    High,
    Max,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::NoEdge => write!(f, "NO_EDGE"),
            Tier::Low => write!(f, "LOW"),
            Tier::Mid => write!(f, "MID"),
            Tier::High => write!(f, "HIGH"),
            Tier::Max => write!(f, "MAX"),
        }
    }
}

// ---------------------------------------------------------------------------
// Market & quote
// ---------------------------------------------------------------------------

/// A player-prop identity: one stat line for one player.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropId {
    pub player: String,
    pub stat: String,
}

/// A market as quoted by one book. Only line-bearing variants carry a line,
/// so a moneyline can never be asked for one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Market {
    Moneyline,
    Spread { line: f64 },
    Total { line: f64 },
    TeamTotal { line: f64 },
    PlayerProp { player: String, stat: String, line: f64 },
}

impl Market {
    pub fn kind(&self) -> MarketType {
        match self {
            Market::Moneyline => MarketType::Moneyline,
            Market::Spread { .. } => MarketType::Spread,
            Market::Total { .. } => MarketType::Total,
            Market::TeamTotal { .. } => MarketType::TeamTotal,
            Market::PlayerProp { .. } => MarketType::PlayerProp,
        }
    }

    pub fn line(&self) -> Option<f64> {
        match self {
            Market::Moneyline => None,
            Market::Spread { line }
            | Market::Total { line }
            | Market::TeamTotal { line }
            | Market::PlayerProp { line, .. } => Some(*line),
        }
    }

    pub fn prop(&self) -> Option<PropId> {
        match self {
            Market::PlayerProp { player, stat, .. } => Some(PropId {
                player: player.clone(),
                stat: stat.clone(),
            }),
            _ => None,
        }
    }
}

/// Identity of a two-way market within a game: type, period, and prop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    pub market_type: MarketType,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop: Option<PropId>,
}

impl MarketKey {
    pub fn new(market_type: MarketType, period: Period) -> Self {
        Self {
            market_type,
            period,
            prop: None,
        }
    }

    /// (primary, secondary) sides of this market.
    pub fn sides(&self) -> (Side, Side) {
        self.market_type.sides()
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prop {
            Some(p) => write!(f, "{} {} {}/{}", self.period, self.market_type, p.player, p.stat),
            None => write!(f, "{} {}", self.period, self.market_type),
        }
    }
}

/// Identity of one outcome: a market plus a side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuoteKey {
    pub market: MarketKey,
    pub side: Side,
}

/// One book's price for one outcome of one market at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub book_id: String,
    pub market: Market,
    pub period: Period,
    pub side: Side,
    /// American odds.
    pub price: i32,
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn line(&self) -> Option<f64> {
        self.market.line()
    }

    pub fn market_key(&self) -> MarketKey {
        MarketKey {
            market_type: self.market.kind(),
            period: self.period,
            prop: self.market.prop(),
        }
    }

    pub fn key(&self) -> QuoteKey {
        QuoteKey {
            market: self.market_key(),
            side: self.side,
        }
    }

    /// Reject zero odds and non-finite lines.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.price == 0 {
            return Err(EngineError::InvalidOdds(self.price));
        }
        match self.line() {
            Some(l) if !l.is_finite() => Err(EngineError::InvalidLine(l)),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line().map(|l| format!(" {l:+}")).unwrap_or_default();
        write!(
            f,
            "[{}] {} {}{} {} @ {}",
            self.book_id,
            self.period,
            self.market.kind(),
            line,
            self.side,
            crate::odds::format_american(self.price),
        )
    }
}

/// Median price/line across contributing books for one outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusQuote {
    pub key: QuoteKey,
    pub line: Option<f64>,
    pub price: i32,
    pub book_count: usize,
}

/// Fair-value anchor for line-movement signals. Spread lines are stored
/// from the home side's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningReference {
    pub market: MarketKey,
    pub line: f64,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
    /// True when prorated from the full-game opening rather than observed.
    #[serde(default)]
    pub estimated: bool,
}

// ---------------------------------------------------------------------------
// Signals & scores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    LineMovement,
    CrossBookDispersion,
    SharpDivergence,
    ContextModifier,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::LineMovement => write!(f, "line_movement"),
            SignalKind::CrossBookDispersion => write!(f, "cross_book_dispersion"),
            SignalKind::SharpDivergence => write!(f, "sharp_divergence"),
            SignalKind::ContextModifier => write!(f, "context_modifier"),
        }
    }
}

/// An independently computed edge contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSignal {
    pub kind: SignalKind,
    /// Signed percentage: positive favours the primary side (home/over),
    /// negative the secondary side (away/under).
    pub magnitude_pct: f64,
    pub detail: String,
}

impl EdgeSignal {
    /// Build a signal favouring `side` with an unsigned magnitude.
    pub fn favoring(kind: SignalKind, side: Side, pct: f64, detail: impl Into<String>) -> Self {
        let pct = pct.abs();
        Self {
            kind,
            magnitude_pct: if side.is_primary() { pct } else { -pct },
            detail: detail.into(),
        }
    }

    /// The side this signal benefits, or `None` for a zero magnitude.
    pub fn favors(&self, market: &MarketKey) -> Option<Side> {
        let (primary, secondary) = market.sides();
        if self.magnitude_pct > 0.0 {
            Some(primary)
        } else if self.magnitude_pct < 0.0 {
            Some(secondary)
        } else {
            None
        }
    }

    pub fn strength(&self) -> f64 {
        self.magnitude_pct.abs()
    }
}

impl fmt::Display for EdgeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}% ({})", self.kind, self.strength(), self.detail)
    }
}

/// Blended result for one side of one market/period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideScore {
    pub market: MarketKey,
    pub side: Side,
    /// 0–100. `None` when the side has neither quotes nor a favouring signal.
    pub confidence: Option<u8>,
    pub tier: Tier,
    /// Winning (context-adjusted) edge magnitude in percent.
    pub edge_pct: f64,
    /// Whether this side is the published edge of its market.
    pub is_edge: bool,
    /// De-vigged EV, when both sides' prices are known.
    pub expected_value: Option<f64>,
    pub contributing_signals: Vec<EdgeSignal>,
    pub rationale: String,
}

impl SideScore {
    /// A side with nothing to say about it.
    pub fn unset(market: MarketKey, side: Side) -> Self {
        Self {
            market,
            side,
            confidence: None,
            tier: Tier::NoEdge,
            edge_pct: 0.0,
            is_edge: false,
            expected_value: None,
            contributing_signals: Vec::new(),
            rationale: "no data".to_string(),
        }
    }

    pub fn confidence_or_zero(&self) -> u8 {
        self.confidence.unwrap_or(0)
    }
}

impl fmt::Display for SideScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conf = self
            .confidence
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let flag = if self.is_edge { " *EDGE*" } else { "" };
        write!(
            f,
            "{} {} CEQ={} {} edge={:.2}%{}",
            self.market, self.side, conf, self.tier, self.edge_pct, flag
        )
    }
}

/// Both sides of one two-way market/period. At most one is flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketScore {
    pub market: MarketKey,
    pub primary: SideScore,
    pub secondary: SideScore,
}

impl MarketScore {
    /// The published edge of this market, if any.
    pub fn edge(&self) -> Option<&SideScore> {
        [&self.primary, &self.secondary]
            .into_iter()
            .find(|s| s.is_edge)
    }

    pub fn side(&self, side: Side) -> Option<&SideScore> {
        [&self.primary, &self.secondary]
            .into_iter()
            .find(|s| s.side == side)
    }
}

// ---------------------------------------------------------------------------
// Game input & output
// ---------------------------------------------------------------------------

/// Free-form numeric ratings for one team (pace, offensive rating, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(flatten)]
    pub ratings: BTreeMap<String, f64>,
}

impl TeamStats {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.ratings.get(name).copied().filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    #[serde(default)]
    pub home: Option<TeamStats>,
    #[serde(default)]
    pub away: Option<TeamStats>,
}

/// Everything the engine needs to score one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: String,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    /// Flat, time-stamped quote history; may be empty.
    #[serde(default)]
    pub quotes: Vec<Quote>,
    /// Externally supplied openings; these win over openings derived from `quotes`.
    #[serde(default)]
    pub openings: Vec<OpeningReference>,
    #[serde(default)]
    pub context: TeamContext,
    /// Game-level composite (0–100, 50 = neutral).
    #[serde(default)]
    pub composite_score: Option<f64>,
}

impl GameSnapshot {
    pub fn new(game_id: impl Into<String>, quotes: Vec<Quote>) -> Self {
        Self {
            game_id: game_id.into(),
            home_team: String::new(),
            away_team: String::new(),
            quotes,
            openings: Vec::new(),
            context: TeamContext::default(),
            composite_score: None,
        }
    }
}

/// Per-game scoring result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEdgeSummary {
    pub game_id: String,
    pub markets: Vec<MarketScore>,
    /// Number of published edges across all periods and markets.
    pub total_edge_count: usize,
    /// Highest-confidence published edge.
    pub best_edge: Option<SideScore>,
    /// Quotes dropped at ingestion (zero odds, non-finite line).
    pub rejected_quotes: usize,
}

impl GameEdgeSummary {
    pub fn empty(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            markets: Vec::new(),
            total_edge_count: 0,
            best_edge: None,
            rejected_quotes: 0,
        }
    }

    /// All published edges, in period/market order.
    pub fn edges(&self) -> impl Iterator<Item = &SideScore> {
        self.markets.iter().filter_map(|m| m.edge())
    }
}

impl fmt::Display for GameEdgeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let best = self
            .best_edge
            .as_ref()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "none".to_string());
        write!(
            f,
            "Game {}: markets={} edges={} rejected={} best=[{}]",
            self.game_id,
            self.markets.len(),
            self.total_edge_count,
            self.rejected_quotes,
            best,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the engine and its boundaries.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid American odds: {0}")]
    InvalidOdds(i32),

    #[error("Invalid line: {0}")]
    InvalidLine(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot source error ({source_name}): {message}")]
    Source { source_name: String, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
