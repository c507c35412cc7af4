//! CEQ: multi-book edge scoring engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! reads game snapshots, scores them as one batch and prints the
//! per-game edge summaries as JSON on stdout.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use ceq_engine::config::AppConfig;
use ceq_engine::engine::batch::score_batch;
use ceq_engine::engine::EdgeEngine;
use ceq_engine::source::file::JsonFileSource;
use ceq_engine::source::SnapshotSource;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("CEQ_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        snapshots = %cfg.input.snapshot_path,
        publish_threshold = cfg.engine.publish_threshold,
        sharp_books = ?cfg.engine.sharp_books,
        "CEQ starting up"
    );

    let source = JsonFileSource::new(&cfg.input.snapshot_path);
    let games = source.fetch_games().await?;
    if games.is_empty() {
        warn!(path = %source.path().display(), "No games to score");
    }

    let engine = Arc::new(EdgeEngine::new(cfg.engine));
    let (summaries, report) = score_batch(engine, games).await;

    for summary in &summaries {
        info!(summary = %summary, "Game summary");
    }

    let json = serde_json::to_string_pretty(&summaries).context("Failed to serialise summaries")?;
    println!("{json}");

    info!(report = %report, "CEQ run complete");
    Ok(())
}

/// Initialise the tracing subscriber.
///
/// Uses the `RUST_LOG` env var for filtering (default: `ceq_engine=info`).
/// Set `CEQ_LOG_JSON=1` for JSON-formatted output. Logs go to stderr so
/// stdout carries only the summaries.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ceq_engine=info"));

    let json_logging = std::env::var("CEQ_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
