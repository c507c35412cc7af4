//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! engine key is optional: omitted keys fall back to `EngineConfig::default()`,
//! which carries the production constants.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::types::EngineError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Scoring constants.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum confidence for a side to be published as the edge.
    pub publish_threshold: u8,
    /// Line-movement points → percent, spreads.
    pub spread_scale: f64,
    /// Line-movement points → percent, totals and team totals.
    pub total_scale: f64,
    /// Prop line-divergence points → percent.
    pub prop_line_scale: f64,
    /// Retail/sharp prop line gap at which line parity replaces price divergence.
    pub prop_line_gap: f64,
    /// Dispersion gaps below this (percentage points) are noise.
    pub dispersion_min_pct: f64,
    pub half_fraction: f64,
    pub quarter_fraction: f64,
    pub period_fraction: f64,
    /// Reference books treated as sharp; everything else is retail.
    pub sharp_books: Vec<String>,
    pub context: ContextConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            publish_threshold: 56,
            spread_scale: 3.0,
            total_scale: 1.5,
            prop_line_scale: 3.0,
            prop_line_gap: 0.5,
            dispersion_min_pct: 0.5,
            half_fraction: 0.5,
            quarter_fraction: 0.25,
            period_fraction: 0.33,
            sharp_books: vec!["pinnacle".to_string()],
            context: ContextConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn is_sharp(&self, book_id: &str) -> bool {
        self.sharp_books
            .iter()
            .any(|b| b.eq_ignore_ascii_case(book_id))
    }

    /// Reject values that would make scoring meaningless.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.publish_threshold > 100 {
            return Err(EngineError::Config(format!(
                "publish_threshold must be <= 100, got {}",
                self.publish_threshold
            )));
        }
        for (name, v) in [
            ("spread_scale", self.spread_scale),
            ("total_scale", self.total_scale),
            ("prop_line_scale", self.prop_line_scale),
            ("prop_line_gap", self.prop_line_gap),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(EngineError::Config(format!("{name} must be positive, got {v}")));
            }
        }
        if !(self.dispersion_min_pct.is_finite() && self.dispersion_min_pct >= 0.0) {
            return Err(EngineError::Config(format!(
                "dispersion_min_pct must be >= 0, got {}",
                self.dispersion_min_pct
            )));
        }
        for (name, v) in [
            ("half_fraction", self.half_fraction),
            ("quarter_fraction", self.quarter_fraction),
            ("period_fraction", self.period_fraction),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(EngineError::Config(format!("{name} must be in (0, 1], got {v}")));
            }
        }
        self.context.validate()
    }
}

/// Composite-score bands for the context modifier. High composites boost
/// the over/home side, low composites the under/away side.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    pub strong_high: f64,
    pub mild_high: f64,
    pub mild_low: f64,
    pub strong_low: f64,
    pub strong_boost: f64,
    pub mild_boost: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            strong_high: 60.0,
            mild_high: 55.0,
            mild_low: 45.0,
            strong_low: 40.0,
            strong_boost: 1.2,
            mild_boost: 1.1,
        }
    }
}

impl ContextConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if !(self.strong_low <= self.mild_low
            && self.mild_low <= self.mild_high
            && self.mild_high <= self.strong_high)
        {
            return Err(EngineError::Config(
                "context bands must satisfy strong_low <= mild_low <= mild_high <= strong_high"
                    .to_string(),
            ));
        }
        if self.mild_boost < 1.0 || self.strong_boost < self.mild_boost {
            return Err(EngineError::Config(format!(
                "context boosts must satisfy 1.0 <= mild ({}) <= strong ({})",
                self.mild_boost, self.strong_boost
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub snapshot_path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: "snapshots.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.engine.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scoring_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.publish_threshold, 56);
        assert_eq!(cfg.spread_scale, 3.0);
        assert_eq!(cfg.total_scale, 1.5);
        assert_eq!(cfg.half_fraction, 0.5);
        assert_eq!(cfg.quarter_fraction, 0.25);
        assert_eq!(cfg.period_fraction, 0.33);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.engine, EngineConfig::default());
        assert_eq!(cfg.input.snapshot_path, "snapshots.json");
    }

    #[test]
    fn test_parse_partial_override() {
        let cfg = AppConfig::parse(
            r#"
            [engine]
            publish_threshold = 60
            sharp_books = ["pinnacle", "circa"]

            [engine.context]
            strong_boost = 1.3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.publish_threshold, 60);
        assert_eq!(cfg.engine.spread_scale, 3.0);
        assert!(cfg.engine.is_sharp("Circa"));
        assert_eq!(cfg.engine.context.strong_boost, 1.3);
        assert_eq!(cfg.engine.context.mild_boost, 1.1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = EngineConfig::default();
        cfg.publish_threshold = 101;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.quarter_fraction = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.context.mild_boost = 0.9;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.context.mild_high = 70.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_engine() {
        assert!(AppConfig::parse("[engine]\nspread_scale = -1.0").is_err());
    }

    #[test]
    fn test_load_repo_config() {
        // Present when run from the crate root.
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert_eq!(cfg.engine.publish_threshold, 56);
            assert!(cfg.engine.is_sharp("pinnacle"));
        }
    }
}
