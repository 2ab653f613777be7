// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unused_async)]

//! # Datadog Usage Source
//!
//! Incremental extraction of Datadog usage metering data: hourly usage per
//! product family and the month-to-date estimated cost.
//!
//! ## Features
//!
//! - **Two streams**: `hourly_usage_by_product` and `estimated_cost`
//! - **Token pagination**: follows `meta.pagination.next_record_id`
//! - **Incremental sync**: a per-stream watermark that only moves forward,
//!   checkpointed every 500 records
//! - **Composable engine**: pagination, extraction and cursor merging are
//!   injected strategies
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use datadog_usage_source::engine::SyncEngine;
//! use datadog_usage_source::http::HttpClient;
//! use datadog_usage_source::source::{DatadogUsageSource, Source};
//! use datadog_usage_source::state::StreamState;
//!
//! #[tokio::main]
//! async fn main() -> datadog_usage_source::Result<()> {
//!     let config = serde_json::json!({
//!         "api_key": "...",
//!         "application_key": "...",
//!         "site": "datadoghq.com",
//!         "hourly_usage_by_product": { "product_families": ["all"] }
//!     });
//!
//!     let source = DatadogUsageSource::new();
//!     let status = source.check_connection(&config).await?;
//!
//!     let client = HttpClient::with_config(source.client_config(&config)?)?;
//!     let mut engine = SyncEngine::new(client);
//!     let mut messages = Vec::new();
//!     for stream in source.streams(&config)? {
//!         stream.sync(&mut engine, &StreamState::new(), &mut messages).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Source Interface                       │
//! │  spec() → ConnectorSpec   check_connection() → CheckResult   │
//! │  streams() → [SourceStream]   discover() → Catalog           │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬─────────────────┴──┬──────────────┬─────────────┐
//! │   HTTP    │      Streams       │  Paginate    │   State     │
//! ├───────────┼────────────────────┼──────────────┼─────────────┤
//! │ GET       │ hourly usage       │ next_record  │ Watermark   │
//! │ Timeout   │ estimated cost     │ _id token    │ Checkpoints │
//! └───────────┴────────────────────┴──────────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Source configuration and catalog types
pub mod config;

/// HTTP client
pub mod http;

/// Pagination strategies
pub mod pagination;

/// State management and cursor merging
pub mod state;

/// Datadog usage streams
pub mod streams;

/// Main execution engine
pub mod engine;

/// Source trait and the Datadog usage source
pub mod source;

/// Registered sources
pub mod registry;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use source::{CheckResult, DatadogUsageSource, Source, SourceStream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
