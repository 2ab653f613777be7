//! Estimated cost for the current billing month
//!
//! `GET /api/v2/usage/estimated_cost?start_month=YYYY-MM` returns one entry per
//! organization with a per-product charge breakdown. The month filter and the
//! `sync_date` / `month` fields come from the wall clock, not from the payload,
//! so the `sync_date` cursor deduplicates runs rather than filtering server-side.

use super::clock::{Clock, SystemClock};
use super::common::{data_entries, parse_entry, to_record, ApiCredentials};
use super::{RecordExtractor, Stream};
use crate::config::SourceConfig;
use crate::error::Result;
use crate::pagination::PageToken;
use crate::state::StreamState;
use crate::types::{QueryParams, Record};
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Endpoint path
pub const ESTIMATED_COST_PATH: &str = "/api/v2/usage/estimated_cost";

const STREAM_NAME: &str = "estimated_cost";
const CURSOR_FIELD: &str = "sync_date";

/// Estimated cost of one organization for one billing month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRecord {
    /// Date the connector ran, `YYYY-MM-DD`
    pub sync_date: String,
    /// Billing month, `YYYY-MM`
    pub month: String,
    pub org_name: String,
    pub total_cost: Number,
    /// Charges in the order the API returned them
    pub charges: Vec<Charge>,
}

/// One line of the per-product charge breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub product_name: String,
    pub charge_type: String,
    pub cost: Number,
    pub last_aggregation_function: String,
}

#[derive(Deserialize)]
struct CostEntry {
    attributes: CostAttributes,
}

#[derive(Deserialize)]
struct CostAttributes {
    org_name: String,
    total_cost: Number,
    charges: Vec<Charge>,
}

/// Stream over the current month's estimated cost, cursored on `sync_date`
#[derive(Clone)]
pub struct EstimatedCostStream {
    credentials: ApiCredentials,
    url_base: String,
    clock: Arc<dyn Clock>,
}

impl EstimatedCostStream {
    /// Create the stream using the system clock
    pub fn new(credentials: ApiCredentials, url_base: impl Into<String>) -> Self {
        Self {
            credentials,
            url_base: url_base.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create the stream from a validated source config
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(
            ApiCredentials::new(&config.api_key, &config.application_key),
            config.api_base_url(),
        )
    }

    /// Replace the clock used for the month filter and synthetic fields
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn current_month(&self) -> String {
        self.clock.today().format("%Y-%m").to_string()
    }
}

impl RecordExtractor for EstimatedCostStream {
    fn extract(&self, body: &Value) -> Result<Vec<Record>> {
        let today = self.clock.today();
        let sync_date = today.format("%Y-%m-%d").to_string();
        let month = today.format("%Y-%m").to_string();

        let entries = data_entries(STREAM_NAME, body)?;
        debug!("Extracting {} cost entries for {month}", entries.len());

        entries
            .iter()
            .map(|entry| {
                let entry: CostEntry = parse_entry(STREAM_NAME, entry)?;
                let record = CostRecord {
                    sync_date: sync_date.clone(),
                    month: month.clone(),
                    org_name: entry.attributes.org_name,
                    total_cost: entry.attributes.total_cost,
                    charges: entry.attributes.charges,
                };
                to_record(STREAM_NAME, &record)
            })
            .collect()
    }
}

impl Stream for EstimatedCostStream {
    fn name(&self) -> &str {
        STREAM_NAME
    }

    fn url_base(&self) -> &str {
        &self.url_base
    }

    fn path(&self) -> &str {
        ESTIMATED_COST_PATH
    }

    fn primary_key(&self) -> Vec<String> {
        vec![CURSOR_FIELD.to_string(), "month".to_string()]
    }

    fn cursor_field(&self) -> &str {
        CURSOR_FIELD
    }

    fn request_headers(&self) -> HashMap<String, String> {
        self.credentials.headers()
    }

    fn request_params(&self, _state: &StreamState, page_token: Option<&PageToken>) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("start_month".to_string(), self.current_month());

        if let Some(token) = page_token {
            token.merge_into(&mut params);
        }

        params
    }

    fn json_schema(&self) -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "sync_date": {"type": "string", "format": "date"},
                "month": {"type": "string"},
                "org_name": {"type": "string"},
                "total_cost": {"type": "number"},
                "charges": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "product_name": {"type": "string"},
                            "charge_type": {"type": "string"},
                            "cost": {"type": "number"},
                            "last_aggregation_function": {"type": "string"}
                        },
                        "required": ["product_name", "charge_type", "cost", "last_aggregation_function"]
                    }
                }
            },
            "required": ["sync_date", "month", "org_name", "total_cost", "charges"]
        })
    }
}

impl std::fmt::Debug for EstimatedCostStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstimatedCostStream")
            .field("url_base", &self.url_base)
            .finish_non_exhaustive()
    }
}
