//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::types::QueryParams;
use serde_json::Value;

/// Opaque pagination token, carried as the query parameter(s) that select the next page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageToken {
    params: QueryParams,
}

impl PageToken {
    /// Create a token from a single query parameter
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = QueryParams::new();
        params.insert(key.into(), value.into());
        Self { params }
    }

    /// Merge the token's parameters into a request's parameter set
    pub fn merge_into(&self, params: &mut QueryParams) {
        for (key, value) in &self.params {
            params.insert(key.clone(), value.clone());
        }
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available with this token
    Continue(PageToken),
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a single parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Continue(PageToken::new(key, value))
    }

    /// The token for the next page, if any
    pub fn token(&self) -> Option<&PageToken> {
        match self {
            Self::Continue(token) => Some(token),
            Self::Done => None,
        }
    }
}

/// Extracts the next page token from a page's parsed body
pub trait PageTokenExtractor: Send + Sync {
    /// Inspect one response body and decide whether another page follows
    fn next_page(&self, body: &Value) -> NextPage;
}

/// Follow a dot-separated path into a JSON value
///
/// Returns `None` as soon as a segment is missing or a non-object is crossed.
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}
