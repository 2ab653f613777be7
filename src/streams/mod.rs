//! Stream definitions
//!
//! A stream is one Datadog endpoint with its own schema and sync state.
//! Each stream supplies request parameters and record extraction; pagination
//! and watermark tracking are injected into the sync engine separately.
//!
//! # Streams
//!
//! - `hourly_usage_by_product` - `/api/v2/usage/hourly_usage`, cursor `timestamp`
//! - `estimated_cost` - `/api/v2/usage/estimated_cost`, cursor `sync_date`

mod clock;
mod common;
mod estimated_cost;
mod hourly_usage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use common::{ApiCredentials, API_KEY_HEADER, APPLICATION_KEY_HEADER};
pub use estimated_cost::{Charge, CostRecord, EstimatedCostStream, ESTIMATED_COST_PATH};
pub use hourly_usage::{
    HourlyUsageByProductStream, Measurement, UsageRecord, HOURLY_USAGE_PATH, PAGE_LIMIT,
};

use crate::error::Result;
use crate::pagination::PageToken;
use crate::state::StreamState;
use crate::types::{QueryParams, Record};
use serde_json::Value;
use std::collections::HashMap;

/// Produces flat records from one page's parsed body
pub trait RecordExtractor: Send + Sync {
    /// Extract every record on the page, failing on the first malformed entry
    fn extract(&self, body: &Value) -> Result<Vec<Record>>;
}

/// One logical endpoint exposed by the source
pub trait Stream: RecordExtractor {
    /// Stream name, also the key of its state
    fn name(&self) -> &str;

    /// Base URL, e.g. `https://api.datadoghq.com`
    fn url_base(&self) -> &str;

    /// Endpoint path below the base URL
    fn path(&self) -> &str;

    /// Fields identifying a record
    fn primary_key(&self) -> Vec<String>;

    /// Field whose maximum value is persisted as the watermark
    fn cursor_field(&self) -> &str;

    /// Headers sent with every request
    fn request_headers(&self) -> HashMap<String, String>;

    /// Query parameters for the next request
    fn request_params(&self, state: &StreamState, page_token: Option<&PageToken>) -> QueryParams;

    /// JSON schema of the emitted records
    fn json_schema(&self) -> Value;

    /// Whether the stream can resume from a persisted watermark
    fn supports_incremental(&self) -> bool {
        true
    }

    /// Full request URL
    fn url(&self) -> String {
        format!(
            "{}/{}",
            self.url_base().trim_end_matches('/'),
            self.path().trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests;
