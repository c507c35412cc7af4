//! Edge magnitude → confidence (CEQ) and tier.
//!
//! Both mappings share the same bands: <1%, 1–3%, 3–6%, 6–10%, ≥10%.
//! The mapping is monotonic and saturates at 75.

use crate::types::Tier;

/// Saturation ceiling of the confidence scale.
pub const MAX_CONFIDENCE: f64 = 75.0;

/// Confidence of no edge at all.
pub const NEUTRAL_CONFIDENCE: u8 = 50;

fn magnitude(edge_pct: f64) -> f64 {
    if edge_pct.is_finite() {
        edge_pct.abs()
    } else {
        0.0
    }
}

/// Unrounded confidence for an edge magnitude in percent. The sign of the
/// edge is ignored.
pub fn confidence_value(edge_pct: f64) -> f64 {
    let pct = magnitude(edge_pct);
    if pct < 1.0 {
        50.0 + pct * 4.0
    } else if pct < 3.0 {
        55.0 + (pct - 1.0) * 2.0
    } else if pct < 6.0 {
        60.0 + (pct - 3.0) * 5.0 / 3.0
    } else if pct < 10.0 {
        66.0 + (pct - 6.0)
    } else {
        MAX_CONFIDENCE.min(71.0 + (pct - 10.0) * 0.5)
    }
}

/// Integer confidence, rounded to nearest.
pub fn confidence(edge_pct: f64) -> u8 {
    confidence_value(edge_pct).round().clamp(0.0, 100.0) as u8
}

pub fn tier(edge_pct: f64) -> Tier {
    let pct = magnitude(edge_pct);
    if pct >= 10.0 {
        Tier::Max
    } else if pct >= 6.0 {
        Tier::High
    } else if pct >= 3.0 {
        Tier::Mid
    } else if pct >= 1.0 {
        Tier::Low
    } else {
        Tier::NoEdge
    }
}
