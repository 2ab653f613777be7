//! Pieces shared by every Datadog stream

use crate::error::{Error, Result};
use crate::types::Record;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "DD-API-KEY";

/// Header carrying the application key
pub const APPLICATION_KEY_HEADER: &str = "DD-APPLICATION-KEY";

/// Datadog API and application keys
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// API key
    pub api_key: String,
    /// Application key
    pub application_key: String,
}

impl ApiCredentials {
    /// Create credentials from both keys
    pub fn new(api_key: impl Into<String>, application_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            application_key: application_key.into(),
        }
    }

    /// Authentication headers for a request
    pub fn headers(&self) -> HashMap<String, String> {
        HashMap::from([
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
            (
                APPLICATION_KEY_HEADER.to_string(),
                self.application_key.clone(),
            ),
        ])
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials").finish_non_exhaustive()
    }
}

/// Entries of the page's top-level `data` list; a missing list is an empty page
pub(crate) fn data_entries<'a>(stream: &str, body: &'a Value) -> Result<&'a [Value]> {
    match body.get("data") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries),
        Some(other) => Err(Error::extraction(
            stream,
            format!("expected 'data' to be an array, found {}", json_kind(other)),
        )),
    }
}

/// Deserialize one response entry, naming the stream on failure
pub(crate) fn parse_entry<T: DeserializeOwned>(stream: &str, entry: &Value) -> Result<T> {
    T::deserialize(entry).map_err(|e| Error::extraction(stream, e.to_string()))
}

/// Serialize an output record into a flat JSON object
pub(crate) fn to_record<T: Serialize>(stream: &str, record: &T) -> Result<Record> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::extraction(
            stream,
            format!("record serialized to {}", json_kind(&other)),
        )),
        Err(e) => Err(Error::extraction(stream, e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
