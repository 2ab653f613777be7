//! Execution engine module
//!
//! Main read loop for one stream.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Runs the paginated incremental fetch loop
//! - `SyncConfig` - Checkpoint interval and record limits
//! - `MessageSink` - Where records, state and logs go
//!
//! One request is in flight at a time. Query parameters for every page are
//! built from the state as it was when the sync started, so the lower bound
//! does not move between pages of the same sync.

mod types;

pub use types::{Message, MessageSink, SyncConfig, SyncStats, DEFAULT_CHECKPOINT_INTERVAL};

use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{NextPage, PageToken, PageTokenExtractor};
use crate::state::{CursorMerger, StreamState};
use crate::streams::Stream;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP client
    client: HttpClient,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync one stream from `initial_state`, returning the final state
    ///
    /// Any HTTP or extraction error aborts the stream; records already pushed
    /// into the sink stay there, and the last checkpoint bounds the rework.
    pub async fn sync_stream(
        &mut self,
        stream: &dyn Stream,
        paginator: &dyn PageTokenExtractor,
        merger: &dyn CursorMerger,
        initial_state: &StreamState,
        sink: &mut dyn MessageSink,
    ) -> Result<StreamState> {
        let start = Instant::now();
        let result = self
            .run_pages(stream, paginator, merger, initial_state, sink)
            .await;
        #[allow(clippy::cast_possible_truncation)]
        self.stats.add_duration(start.elapsed().as_millis() as u64);

        match result {
            Ok(state) => {
                self.stats.add_stream();
                Ok(state)
            }
            Err(e) => {
                self.stats.add_error();
                warn!("Sync of stream {} failed: {e}", stream.name());
                Err(e)
            }
        }
    }

    async fn run_pages(
        &mut self,
        stream: &dyn Stream,
        paginator: &dyn PageTokenExtractor,
        merger: &dyn CursorMerger,
        initial_state: &StreamState,
        sink: &mut dyn MessageSink,
    ) -> Result<StreamState> {
        let name = stream.name();
        let url = stream.url();
        let cursor_field = stream.cursor_field();

        info!("Starting sync for stream: {name}");
        sink.emit(Message::info(format!("Starting sync for stream: {name}")))?;

        let mut state = initial_state.clone();
        let mut page_token: Option<PageToken> = None;
        let mut page_count = 0usize;
        let mut record_count = 0usize;
        let mut last_checkpoint: Option<StreamState> = None;

        'pages: loop {
            let params = stream.request_params(initial_state, page_token.as_ref());
            let mut request = RequestConfig::new().with_query(params);
            for (key, value) in stream.request_headers() {
                request = request.header(key, value);
            }

            let body: Value = self.client.get_json_with_config(&url, request).await?;
            page_count += 1;
            self.stats.add_page();

            let records = stream.extract(&body)?;
            debug!("Page {page_count} of {name}: {} records", records.len());

            for record in records {
                let next_state = merger.merge(&state, &record, cursor_field);
                sink.emit(Message::record(name, record))?;
                state = next_state;
                record_count += 1;
                self.stats.add_records(1);

                if self.config.checkpoint_interval > 0
                    && record_count % self.config.checkpoint_interval == 0
                {
                    self.checkpoint(name, &state, sink)?;
                    last_checkpoint = Some(state.clone());
                }

                if self.config.max_records > 0 && record_count >= self.config.max_records {
                    debug!("Reached max_records ({}) for {name}", self.config.max_records);
                    break 'pages;
                }
            }

            match paginator.next_page(&body) {
                NextPage::Continue(token) => page_token = Some(token),
                NextPage::Done => break,
            }
        }

        if !state.is_empty() && last_checkpoint.as_ref() != Some(&state) {
            self.checkpoint(name, &state, sink)?;
        }

        info!("Completed sync for {name}: {record_count} records in {page_count} pages");
        sink.emit(Message::info(format!(
            "Completed sync for {name}: {record_count} records in {page_count} pages"
        )))?;

        Ok(state)
    }

    fn checkpoint(
        &mut self,
        stream: &str,
        state: &StreamState,
        sink: &mut dyn MessageSink,
    ) -> Result<()> {
        self.stats.add_checkpoint();
        sink.emit(Message::state(stream, state.to_value()))
    }
}
