//! Source trait and the Datadog usage source
//!
//! A source validates configuration, checks connectivity, and hands out the
//! streams it supports, each paired with its pagination and cursor strategy.

use crate::config::{Catalog, CatalogStream, SourceConfig};
use crate::engine::{MessageSink, SyncEngine};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{NextRecordIdPaginator, PageTokenExtractor};
use crate::state::{CursorMerger, MaxCursorMerger, StreamState};
use crate::streams::{
    ApiCredentials, Clock, EstimatedCostStream, HourlyUsageByProductStream, Stream, SystemClock,
};
use crate::types::SyncMode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Path used by the connectivity check
pub const VALIDATE_PATH: &str = "/api/v1/validate";

// ============================================================================
// Connector Spec
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// JSON schema of the configuration
    pub connection_specification: Value,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Source Stream
// ============================================================================

/// A stream together with the strategies the engine drives it with
pub struct SourceStream {
    /// Request building and record extraction
    pub stream: Box<dyn Stream>,
    /// Next page resolution
    pub paginator: Box<dyn PageTokenExtractor>,
    /// Watermark advancement
    pub merger: Box<dyn CursorMerger>,
}

impl SourceStream {
    /// Pair a stream with token pagination and max-cursor merging
    pub fn new(stream: impl Stream + 'static) -> Self {
        Self {
            stream: Box::new(stream),
            paginator: Box::new(NextRecordIdPaginator::default()),
            merger: Box::new(MaxCursorMerger),
        }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        self.stream.name()
    }

    /// Catalog entry for this stream
    pub fn catalog_entry(&self) -> CatalogStream {
        let stream = self.stream.as_ref();
        CatalogStream {
            name: stream.name().to_string(),
            json_schema: stream.json_schema(),
            supported_sync_modes: if stream.supports_incremental() {
                vec![SyncMode::FullRefresh, SyncMode::Incremental]
            } else {
                vec![SyncMode::FullRefresh]
            },
            source_defined_cursor: stream.supports_incremental(),
            default_cursor_field: Some(vec![stream.cursor_field().to_string()]),
            source_defined_primary_key: Some(
                stream
                    .primary_key()
                    .into_iter()
                    .map(|key| vec![key])
                    .collect(),
            ),
        }
    }

    /// Run one sync of this stream
    pub async fn sync(
        &self,
        engine: &mut SyncEngine,
        state: &StreamState,
        sink: &mut dyn MessageSink,
    ) -> Result<StreamState> {
        engine
            .sync_stream(
                self.stream.as_ref(),
                self.paginator.as_ref(),
                self.merger.as_ref(),
                state,
                sink,
            )
            .await
    }
}

impl std::fmt::Debug for SourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceStream")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Source Trait
// ============================================================================

/// Core trait that all sources implement
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the connector specification (for UI/validation)
    fn spec(&self) -> ConnectorSpec;

    /// Tests if credentials and configuration are valid
    ///
    /// Connectivity failures are reported in the `CheckResult`; only an
    /// unusable configuration is returned as an error.
    async fn check_connection(&self, config: &Value) -> Result<CheckResult>;

    /// Instantiates the streams this source exposes
    fn streams(&self, config: &Value) -> Result<Vec<SourceStream>>;

    /// HTTP client settings for syncing the streams
    fn client_config(&self, _config: &Value) -> Result<HttpClientConfig> {
        Ok(HttpClientConfig::default())
    }

    /// Lists available streams with their schemas
    fn discover(&self, config: &Value) -> Result<Catalog> {
        let streams = self
            .streams(config)?
            .iter()
            .map(SourceStream::catalog_entry)
            .collect();
        Ok(Catalog { streams })
    }
}

// ============================================================================
// Datadog Usage Source
// ============================================================================

/// Source for Datadog usage metering and estimated cost
#[derive(Clone)]
pub struct DatadogUsageSource {
    clock: Arc<dyn Clock>,
}

impl DatadogUsageSource {
    /// Create the source using the system clock
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Create the source with a custom clock for the cost stream
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for DatadogUsageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DatadogUsageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatadogUsageSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for DatadogUsageSource {
    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec {
            name: "datadog-usage".to_string(),
            title: "Datadog Usage".to_string(),
            description: Some(
                "Hourly usage by product family and estimated cost from the Datadog usage metering API"
                    .to_string(),
            ),
            connection_specification: connection_specification(),
        }
    }

    async fn check_connection(&self, config: &Value) -> Result<CheckResult> {
        let config = SourceConfig::from_value(config)?;
        let credentials = ApiCredentials::new(&config.api_key, &config.application_key);

        let mut client_config = client_config_for(&config);
        client_config.base_url = Some(config.api_base_url());
        let client = HttpClient::with_config(client_config)?;

        let mut request = RequestConfig::new();
        request.headers = credentials.headers();

        info!("Checking connection to {}", config.api_base_url());
        let result = match client.get_with_config(VALIDATE_PATH, request).await {
            Ok(_) => CheckResult::success(),
            Err(Error::HttpStatus { status, body }) => {
                CheckResult::failure(format!("HTTP {status}: {body}"))
            }
            // Transport failures report reqwest's message without the crate prefix
            Err(Error::Http(e)) => CheckResult::failure(e.to_string()),
            Err(e) => CheckResult::failure(e.to_string()),
        };

        if let Some(message) = &result.message {
            warn!("Connection check failed: {message}");
        }
        Ok(result)
    }

    fn client_config(&self, config: &Value) -> Result<HttpClientConfig> {
        Ok(client_config_for(&SourceConfig::from_value(config)?))
    }

    fn streams(&self, config: &Value) -> Result<Vec<SourceStream>> {
        let config = SourceConfig::from_value(config)?;

        let mut streams = Vec::with_capacity(2);

        // The cost stream needs only credentials; hourly usage needs families
        if config.has_hourly_usage() {
            let hourly = HourlyUsageByProductStream::from_config(&config)?;
            streams.push(SourceStream::new(hourly));
        } else {
            debug!("No hourly usage settings; skipping hourly_usage_by_product");
        }

        let cost = EstimatedCostStream::from_config(&config).with_clock(Arc::clone(&self.clock));
        streams.push(SourceStream::new(cost));

        Ok(streams)
    }
}

fn client_config_for(config: &SourceConfig) -> HttpClientConfig {
    HttpClientConfig::builder().timeout(config.timeout()).build()
}

/// JSON schema of the source configuration
fn connection_specification() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Datadog Usage Spec",
        "type": "object",
        "required": ["api_key", "application_key", "site"],
        "properties": {
            "api_key": {
                "type": "string",
                "title": "API Key",
                "description": "Datadog API key",
                "airbyte_secret": true
            },
            "application_key": {
                "type": "string",
                "title": "Application Key",
                "description": "Datadog application key",
                "airbyte_secret": true
            },
            "site": {
                "type": "string",
                "title": "Site",
                "description": "Datadog site domain",
                "default": "datadoghq.com",
                "examples": ["datadoghq.com", "us3.datadoghq.com", "us5.datadoghq.com", "datadoghq.eu", "ap1.datadoghq.com"]
            },
            "hourly_usage_by_product": {
                "type": "object",
                "title": "Hourly Usage by Product",
                "required": ["product_families"],
                "properties": {
                    "product_families": {
                        "type": "array",
                        "title": "Product Families",
                        "description": "Product families to retrieve, or [\"all\"]",
                        "items": {"type": "string"},
                        "minItems": 1
                    },
                    "start_date": {
                        "type": "string",
                        "title": "Start Date",
                        "description": "Earliest hour to sync on the first run, ISO-8601 (e.g. 2024-01-01T00)",
                        "examples": ["2024-01-01T00"]
                    }
                }
            },
            "timeout_seconds": {
                "type": "integer",
                "title": "Request Timeout",
                "description": "HTTP request timeout in seconds",
                "default": 30,
                "minimum": 1
            }
        }
    })
}
