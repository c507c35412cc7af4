//! Contextual modifier from the game-level composite score.
//!
//! The composite (0–100, 50 neutral) boosts the winning signal of one
//! side multiplicatively. High composites favour the over/home side, low
//! composites the under/away side. The mild bands are inclusive: 55..=60
//! and 40..=45 take the mild boost, anything past 60 or under 40 the
//! strong one. The boost is never below 1.0, so a signal is never reduced.

use crate::config::ContextConfig;
use crate::types::{EdgeSignal, SignalKind, Side, TeamContext};

/// Ratings surfaced in the modifier's detail text when both teams carry them.
const NOTED_RATINGS: &[&str] = &["pace", "off_rating", "def_rating", "injuries"];

#[derive(Debug, Clone, PartialEq)]
pub struct ContextBoost {
    pub composite: f64,
    /// True when the over/home side is boosted.
    pub favors_primary: bool,
    pub multiplier: f64,
    note: Option<String>,
}

impl ContextBoost {
    /// `None` when the composite is absent, non-finite, or strictly
    /// between the mild bounds.
    pub fn from_composite(
        composite: Option<f64>,
        team: &TeamContext,
        config: &ContextConfig,
    ) -> Option<Self> {
        let c = composite.filter(|c| c.is_finite())?;
        let (favors_primary, multiplier) = if c > config.strong_high {
            (true, config.strong_boost)
        } else if c >= config.mild_high {
            (true, config.mild_boost)
        } else if c < config.strong_low {
            (false, config.strong_boost)
        } else if c <= config.mild_low {
            (false, config.mild_boost)
        } else {
            return None;
        };
        Some(Self {
            composite: c,
            favors_primary,
            multiplier: multiplier.max(1.0),
            note: team_note(team),
        })
    }

    pub fn boosts(&self, side: Side) -> bool {
        side.is_primary() == self.favors_primary
    }

    /// Boost `base_pct` for `side`. Returns the boosted magnitude and the
    /// modifier signal (carrying the added magnitude), or `None` if this
    /// side is not the boosted one.
    pub fn apply(&self, side: Side, base_pct: f64) -> Option<(f64, EdgeSignal)> {
        if !self.boosts(side) || base_pct <= 0.0 {
            return None;
        }
        let boosted = base_pct * self.multiplier;
        let mut detail = format!("composite {:.1} -> x{:.2}", self.composite, self.multiplier);
        if let Some(note) = &self.note {
            detail.push_str("; ");
            detail.push_str(note);
        }
        let signal = EdgeSignal::favoring(SignalKind::ContextModifier, side, boosted - base_pct, detail);
        Some((boosted, signal))
    }
}

fn team_note(team: &TeamContext) -> Option<String> {
    let (home, away) = (team.home.as_ref()?, team.away.as_ref()?);
    let parts: Vec<String> = NOTED_RATINGS
        .iter()
        .filter_map(|name| {
            let (h, a) = (home.get(name)?, away.get(name)?);
            Some(format!("{name} {h:.1}/{a:.1}"))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}
