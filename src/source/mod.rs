//! Snapshot sources.
//!
//! Defines the `SnapshotSource` trait: anything that can hand the engine a
//! batch of fully materialised game snapshots (quotes, openings, context).

pub mod file;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::GameSnapshot;

/// Abstraction over where game snapshots come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch every game to be scored in this run.
    async fn fetch_games(&self) -> Result<Vec<GameSnapshot>>;
}
