//! CEQ: multi-book edge scoring engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod odds;
pub mod scoring;
pub mod signals;
pub mod source;
pub mod types;
