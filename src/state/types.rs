//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete state for the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream, or an empty state if none was persisted
    pub fn stream_or_default(&self, stream: &str) -> StreamState {
        self.streams.get(stream).cloned().unwrap_or_default()
    }

    /// Replace state for a stream
    pub fn set_stream(&mut self, stream: &str, state: StreamState) {
        self.streams.insert(stream.to_string(), state);
    }
}

/// Watermark state for a single stream
///
/// Serialized as a flat mapping, e.g. `{"timestamp": "2024-03-19T00:00:00Z"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamState {
    values: BTreeMap<String, String>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state holding one watermark
    pub fn with_cursor(field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.set(field, value);
        state
    }

    /// Get the watermark for a cursor field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Set the watermark for a cursor field
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    /// Whether no watermark has been recorded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// JSON form of this state, as emitted in STATE messages
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}
