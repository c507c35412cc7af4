//! JSON file snapshot source.
//!
//! Reads a JSON array of game snapshots from disk on every fetch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::source::SnapshotSource;
use crate::types::{EngineError, GameSnapshot};

const SOURCE_NAME: &str = "json_file";

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for JsonFileSource {
    async fn fetch_games(&self) -> Result<Vec<GameSnapshot>> {
        if !self.path.exists() {
            return Err(EngineError::Source {
                source_name: SOURCE_NAME.to_string(),
                message: format!("snapshot file not found: {}", self.path.display()),
            }
            .into());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read snapshots from {}", self.path.display()))?;

        let games: Vec<GameSnapshot> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshots from {}", self.path.display()))?;

        debug!(path = %self.path.display(), games = games.len(), "Snapshots loaded");
        Ok(games)
    }
}
