//! Pagination strategy implementations

use super::types::{extract_path, NextPage, PageTokenExtractor};
use serde_json::Value;

/// Path of the next page token in Datadog v2 usage responses
pub const NEXT_RECORD_ID_PATH: &str = "meta.pagination.next_record_id";

/// Query parameter that carries the token back to the API
pub const NEXT_RECORD_ID_PARAM: &str = "next_record_id";

// ============================================================================
// Next Record ID Pagination
// ============================================================================

/// Token pagination used by the Datadog usage metering API
///
/// Reads `meta.pagination.next_record_id` from each page and passes it back
/// verbatim as `?next_record_id=<token>`. A missing, null or empty token ends
/// pagination.
#[derive(Debug, Clone)]
pub struct NextRecordIdPaginator {
    /// Dot path to the token in the response body
    pub token_path: String,
    /// Query parameter name used for the token
    pub token_param: String,
}

impl NextRecordIdPaginator {
    /// Create a paginator reading the token from a custom location
    pub fn new(token_path: impl Into<String>, token_param: impl Into<String>) -> Self {
        Self {
            token_path: token_path.into(),
            token_param: token_param.into(),
        }
    }
}

impl Default for NextRecordIdPaginator {
    fn default() -> Self {
        Self::new(NEXT_RECORD_ID_PATH, NEXT_RECORD_ID_PARAM)
    }
}

impl PageTokenExtractor for NextRecordIdPaginator {
    fn next_page(&self, body: &Value) -> NextPage {
        let token = match extract_path(body, &self.token_path) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return NextPage::Done,
        };

        if token.is_empty() {
            return NextPage::Done;
        }

        NextPage::with_param(&self.token_param, token)
    }
}
