//! Watermark advancement
//!
//! ISO-8601 timestamps and dates in the Datadog API are fixed-width and
//! zero-padded, so string order equals chronological order.

use super::types::StreamState;
use crate::types::Record;
use serde_json::Value;

/// Computes the new stream state after a record is emitted
pub trait CursorMerger: Send + Sync {
    /// Merge the latest record's cursor value into the current state
    fn merge(&self, current: &StreamState, latest_record: &Record, cursor_field: &str)
        -> StreamState;
}

/// Keeps the greatest cursor value ever seen, so the watermark never regresses
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCursorMerger;

impl CursorMerger for MaxCursorMerger {
    fn merge(
        &self,
        current: &StreamState,
        latest_record: &Record,
        cursor_field: &str,
    ) -> StreamState {
        let latest = latest_record.get(cursor_field).and_then(cursor_string);
        let merged = merge_watermarks(current.get(cursor_field), latest.as_deref());

        match merged {
            Some(value) => StreamState::with_cursor(cursor_field, value),
            None => StreamState::new(),
        }
    }
}

/// `max(current, latest)` when both are present, else whichever is present
pub fn merge_watermarks(current: Option<&str>, latest: Option<&str>) -> Option<String> {
    match (current, latest) {
        (Some(current), Some(latest)) => Some(current.max(latest).to_string()),
        (Some(value), None) | (None, Some(value)) => Some(value.to_string()),
        (None, None) => None,
    }
}

fn cursor_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
