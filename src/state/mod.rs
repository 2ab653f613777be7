//! State management module
//!
//! Handles watermark tracking, checkpointing, and resumability.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `StreamState` - Single-cursor watermark for one stream
//! - `State` - Per-stream state document owned by the orchestrator
//! - `CursorMerger` / `MaxCursorMerger` - Watermark advancement per record
//! - `StateManager` - File-based state persistence

mod cursor;
mod manager;
mod types;

pub use cursor::{merge_watermarks, CursorMerger, MaxCursorMerger};
pub use manager::StateManager;
pub use types::{State, StreamState};

#[cfg(test)]
mod manager_tests;
