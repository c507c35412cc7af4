//! Line movement against the opening line.
//!
//! The moved distance is scaled by a market-specific factor. Spreads are
//! compared from the home side's perspective; the side whose number got
//! easier to cover (more points taken, fewer laid, or an easier total)
//! is the one favoured.

use crate::aggregator::{home_perspective_line, median_line};
use crate::config::EngineConfig;
use crate::types::{EdgeSignal, MarketKey, MarketType, OpeningReference, Quote, SignalKind, Side};

/// Points-to-percent factor for a market, if it has line movement at all.
pub fn scale_factor(market_type: MarketType, config: &EngineConfig) -> Option<f64> {
    match market_type {
        MarketType::Spread => Some(config.spread_scale),
        MarketType::Total | MarketType::TeamTotal => Some(config.total_scale),
        MarketType::Moneyline | MarketType::PlayerProp => None,
    }
}

/// Current consensus line from the home perspective: the primary side's
/// median if it is quoted, otherwise the secondary side's.
pub fn current_line(market: &MarketKey, current: &[&Quote]) -> Option<f64> {
    let (primary, secondary) = market.sides();
    [primary, secondary].into_iter().find_map(|side| {
        let lines: Vec<f64> = current
            .iter()
            .filter(|q| q.side == side)
            .filter_map(|q| home_perspective_line(q))
            .collect();
        median_line(&lines)
    })
}

pub fn line_movement(
    market: &MarketKey,
    current: &[&Quote],
    opening: &OpeningReference,
    config: &EngineConfig,
) -> Option<EdgeSignal> {
    let scale = scale_factor(market.market_type, config)?;
    let now = current_line(market, current)?;
    let delta = now - opening.line;
    if !delta.is_finite() || delta.abs() < 1e-9 {
        return None;
    }

    // Spread: a higher home-perspective line means home lays fewer points.
    // Total: a higher line makes the under easier to clear.
    let favored = match (market.market_type, delta > 0.0) {
        (MarketType::Spread, true) => Side::Home,
        (MarketType::Spread, false) => Side::Away,
        (_, true) => Side::Under,
        (_, false) => Side::Over,
    };

    let pct = delta.abs() * scale;
    let mut detail = format!(
        "{} moved {} -> {} ({:.2} pts x {scale})",
        market.market_type,
        opening.line,
        now,
        delta.abs(),
    );
    if opening.estimated {
        detail.push_str("; opening estimated from full-game line (approximation)");
    }
    Some(EdgeSignal::favoring(SignalKind::LineMovement, favored, pct, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Market, Period};
    use chrono::Utc;

    fn quote(market: Market, side: Side, price: i32) -> Quote {
        Quote {
            book_id: "book".to_string(),
            market,
            period: Period::FullGame,
            side,
            price,
            observed_at: Utc::now(),
        }
    }

    fn opening(market: &MarketKey, line: f64) -> OpeningReference {
        OpeningReference {
            market: market.clone(),
            line,
            observed_at: None,
            estimated: false,
        }
    }

    #[test]
    fn test_spread_move_favours_side_whose_number_improved() {
        let market = MarketKey::new(MarketType::Spread, Period::FullGame);
        let quotes = [
            quote(Market::Spread { line: -3.0 }, Side::Home, -110),
            quote(Market::Spread { line: -2.5 }, Side::Home, -105),
        ];
        let refs: Vec<&Quote> = quotes.iter().collect();
        let signal = line_movement(&market, &refs, &opening(&market, -1.5), &EngineConfig::default())
            .unwrap();
        assert!((signal.strength() - 3.75).abs() < 1e-9);
        // Home now lays 2.75 instead of 1.5: the away number improved.
        assert_eq!(signal.favors(&market), Some(Side::Away));
    }

    #[test]
    fn test_spread_from_away_quotes_only() {
        let market = MarketKey::new(MarketType::Spread, Period::FullGame);
        let quotes = [quote(Market::Spread { line: 1.0 }, Side::Away, -110)];
        let refs: Vec<&Quote> = quotes.iter().collect();
        let signal = line_movement(&market, &refs, &opening(&market, -3.0), &EngineConfig::default())
            .unwrap();
        // Home line went -3.0 -> -1.0.
        assert_eq!(signal.favors(&market), Some(Side::Home));
        assert!((signal.strength() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_is_down_weighted() {
        let market = MarketKey::new(MarketType::Total, Period::FullGame);
        let quotes = [quote(Market::Total { line: 222.0 }, Side::Over, -110)];
        let refs: Vec<&Quote> = quotes.iter().collect();
        let signal = line_movement(&market, &refs, &opening(&market, 220.0), &EngineConfig::default())
            .unwrap();
        assert!((signal.strength() - 3.0).abs() < 1e-9);
        assert_eq!(signal.favors(&market), Some(Side::Under));
    }

    #[test]
    fn test_no_move_no_signal() {
        let market = MarketKey::new(MarketType::Total, Period::FullGame);
        let quotes = [quote(Market::Total { line: 220.0 }, Side::Under, -110)];
        let refs: Vec<&Quote> = quotes.iter().collect();
        assert!(line_movement(&market, &refs, &opening(&market, 220.0), &EngineConfig::default())
            .is_none());
    }

    #[test]
    fn test_moneyline_has_no_movement() {
        let market = MarketKey::new(MarketType::Moneyline, Period::FullGame);
        let quotes = [quote(Market::Moneyline, Side::Home, -150)];
        let refs: Vec<&Quote> = quotes.iter().collect();
        assert!(line_movement(&market, &refs, &opening(&market, 0.0), &EngineConfig::default())
            .is_none());
    }

    #[test]
    fn test_estimated_opening_is_labelled() {
        let market = MarketKey::new(MarketType::Spread, Period::FirstHalf);
        let quotes = [quote(Market::Spread { line: -2.5 }, Side::Home, -110)];
        let refs: Vec<&Quote> = quotes.iter().collect();
        let mut open = opening(&market, -1.5);
        open.estimated = true;
        let signal = line_movement(&market, &refs, &open, &EngineConfig::default()).unwrap();
        assert!(signal.detail.contains("approximation"));
    }
}
