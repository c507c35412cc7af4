//! American-odds arithmetic.
//!
//! Implied probability, de-vigged two-way expected value, and price
//! formatting. Pure functions, no state.

use crate::types::EngineError;

/// Implied win probability of an American price.
///
/// `-150` → 0.60, `+150` → 0.40. Zero is not a valid American price.
pub fn implied_probability(american_odds: i32) -> Result<f64, EngineError> {
    let odds = f64::from(american_odds);
    if american_odds < 0 {
        Ok(-odds / (-odds + 100.0))
    } else if american_odds > 0 {
        Ok(100.0 / (odds + 100.0))
    } else {
        Err(EngineError::InvalidOdds(american_odds))
    }
}

/// Profit per unit staked at an American price (`+140` → 1.40, `-150` → 0.667).
pub fn profit_per_unit(american_odds: i32) -> Result<f64, EngineError> {
    let odds = f64::from(american_odds);
    if american_odds < 0 {
        Ok(100.0 / -odds)
    } else if american_odds > 0 {
        Ok(odds / 100.0)
    } else {
        Err(EngineError::InvalidOdds(american_odds))
    }
}

/// Decimal (European) odds: total return per unit staked.
pub fn decimal_odds(american_odds: i32) -> Result<f64, EngineError> {
    Ok(profit_per_unit(american_odds)? + 1.0)
}

/// Vig-free probabilities of a two-way market, summing to 1.
pub fn devig(price_a: i32, price_b: i32) -> Result<(f64, f64), EngineError> {
    let pa = implied_probability(price_a)?;
    let pb = implied_probability(price_b)?;
    let total = pa + pb;
    Ok((pa / total, pb / total))
}

/// Expected value per unit of taking `price_a`, judged against the
/// de-vigged probability of `price_b`.
///
/// The two implied probabilities are normalised to sum to 1; the
/// normalised probability of `price_b` is the win probability applied to
/// `price_a`'s payout. Returns `None` when either price is missing or
/// invalid; callers treat `None` as "not disqualifying".
pub fn two_way_expected_value(price_a: Option<i32>, price_b: Option<i32>) -> Option<f64> {
    let (a, b) = (price_a?, price_b?);
    let (_, fair_b) = devig(a, b).ok()?;
    let payout = decimal_odds(a).ok()?;
    let ev = fair_b * payout - 1.0;
    ev.is_finite().then_some(ev)
}

/// `+` prefix for positive prices, negative prices as-is.
pub fn format_american(price: i32) -> String {
    if price > 0 {
        format!("+{price}")
    } else {
        price.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
