//! Edge signals.
//!
//! Each signal is computed independently and is optional: missing inputs
//! omit the signal rather than erroring.

pub mod context;
pub mod dispersion;
pub mod line_movement;
pub mod sharp;

use tracing::debug;

use crate::config::EngineConfig;
use crate::types::{EdgeSignal, MarketKey, OpeningReference, Quote};

pub use context::ContextBoost;

/// Computes every applicable signal for one market/period.
pub struct SignalSet<'a> {
    config: &'a EngineConfig,
}

impl<'a> SignalSet<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// All signals for `market`, given its current quotes (latest per book,
    /// both sides) and its opening reference, if any.
    pub fn collect(
        &self,
        market: &MarketKey,
        current: &[&Quote],
        opening: Option<&OpeningReference>,
    ) -> Vec<EdgeSignal> {
        let mut signals = Vec::new();

        match opening {
            Some(open) => {
                if let Some(s) = line_movement::line_movement(market, current, open, self.config) {
                    signals.push(s);
                }
            }
            None => debug!(market = %market, "No opening reference, skipping line movement"),
        }

        let (primary, secondary) = market.sides();
        for side in [primary, secondary] {
            if let Some(s) = dispersion::dispersion(side, current, self.config) {
                signals.push(s);
            }
        }

        signals.extend(sharp::sharp_divergence(market, current, self.config));

        debug!(market = %market, count = signals.len(), "Signals collected");
        signals
    }
}
