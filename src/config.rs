//! Source configuration and catalog types
//!
//! The configuration is supplied by the embedding process as JSON (or YAML)
//! and is immutable once parsed. Credentials are never printed by `Debug`.

use crate::error::{Error, Result};
use crate::types::SyncMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Default request timeout when `timeout_seconds` is not configured
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// ============================================================================
// Source Config
// ============================================================================

/// Top-level configuration for the Datadog usage source
#[derive(Clone, Deserialize)]
pub struct SourceConfig {
    /// Datadog API key (`DD-API-KEY`)
    pub api_key: String,

    /// Datadog application key (`DD-APPLICATION-KEY`)
    pub application_key: String,

    /// Datadog site domain, e.g. `datadoghq.com` or `datadoghq.eu`
    pub site: String,

    /// Settings for the hourly usage stream
    #[serde(default)]
    pub hourly_usage_by_product: Option<HourlyUsageConfig>,

    /// Legacy top-level product families, used when the nested block is absent
    #[serde(default)]
    pub product_families: Option<Vec<String>>,

    /// Legacy top-level start date, used when the nested block is absent
    #[serde(default)]
    pub start_date: Option<String>,

    /// Override for the API base URL (defaults to `https://api.<site>`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Configuration for the hourly usage by product family stream
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HourlyUsageConfig {
    /// Product families to request, joined with commas on the wire
    #[serde(default)]
    pub product_families: Vec<String>,

    /// Lower bound for the first sync, e.g. `2024-01-01T00`
    #[serde(default)]
    pub start_date: Option<String>,
}

impl SourceConfig {
    /// Parse and validate a config from a JSON value
    pub fn from_value(value: &Value) -> Result<Self> {
        let config: SourceConfig = serde_json::from_value(value.clone())
            .map_err(|e| Error::config(format!("Invalid source config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check credentials, site and optional overrides
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("api_key", &self.api_key),
            ("application_key", &self.application_key),
            ("site", &self.site),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)
                .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        }

        if self.timeout_seconds == Some(0) {
            return Err(Error::invalid_value(
                "timeout_seconds",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Base URL for every API request
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://api.{}", self.site),
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    /// Whether any hourly usage settings were supplied, nested or legacy
    pub fn has_hourly_usage(&self) -> bool {
        self.hourly_usage_by_product.is_some() || self.product_families.is_some()
    }

    /// Resolve the hourly usage stream settings
    ///
    /// The nested `hourly_usage_by_product` block wins; otherwise the legacy
    /// top-level fields are used.
    pub fn hourly_usage(&self) -> Result<HourlyUsageConfig> {
        let resolved = match &self.hourly_usage_by_product {
            Some(nested) => nested.clone(),
            None => HourlyUsageConfig {
                product_families: self.product_families.clone().unwrap_or_default(),
                start_date: self.start_date.clone(),
            },
        };

        if resolved.product_families.is_empty() {
            return Err(Error::missing_field(
                "hourly_usage_by_product.product_families",
            ));
        }
        if resolved
            .product_families
            .iter()
            .any(|family| family.trim().is_empty())
        {
            return Err(Error::invalid_value(
                "hourly_usage_by_product.product_families",
                "product family names must not be empty",
            ));
        }

        if let Some(start_date) = &resolved.start_date {
            let valid = start_date
                .get(..10)
                .is_some_and(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok());
            if !valid {
                return Err(Error::invalid_value(
                    "hourly_usage_by_product.start_date",
                    format!("'{start_date}' must start with a YYYY-MM-DD date"),
                ));
            }
        }

        Ok(resolved)
    }
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("api_key", &"***")
            .field("application_key", &"***")
            .field("site", &self.site)
            .field("hourly_usage_by_product", &self.hourly_usage_by_product)
            .field("product_families", &self.product_families)
            .field("start_date", &self.start_date)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Load a config document from a JSON or YAML file
pub fn load_config_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: Value,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Whether the cursor is chosen by the source rather than the user
    #[serde(default)]
    pub source_defined_cursor: bool,

    /// Default cursor field
    #[serde(default)]
    pub default_cursor_field: Option<Vec<String>>,

    /// Source-defined primary key
    #[serde(default)]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn base_config() -> Value {
        json!({
            "api_key": "test_api_key",
            "application_key": "test_app_key",
            "site": "datadoghq.com",
        })
    }

    #[test]
    fn test_parse_nested_config() {
        let mut value = base_config();
        value["hourly_usage_by_product"] = json!({
            "product_families": ["infra_hosts", "analyzed_logs"],
            "start_date": "2024-01-01T00"
        });

        let config = SourceConfig::from_value(&value).unwrap();
        let hourly = config.hourly_usage().unwrap();
        assert_eq!(hourly.product_families, vec!["infra_hosts", "analyzed_logs"]);
        assert_eq!(hourly.start_date.as_deref(), Some("2024-01-01T00"));
        assert_eq!(config.api_base_url(), "https://api.datadoghq.com");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_legacy_top_level_config() {
        let mut value = base_config();
        value["product_families"] = json!(["all"]);
        value["start_date"] = json!("2024-01-01T00");

        let config = SourceConfig::from_value(&value).unwrap();
        let hourly = config.hourly_usage().unwrap();
        assert_eq!(hourly.product_families, vec!["all"]);
        assert_eq!(hourly.start_date.as_deref(), Some("2024-01-01T00"));
    }

    #[test]
    fn test_nested_block_wins_over_legacy() {
        let mut value = base_config();
        value["product_families"] = json!(["all"]);
        value["hourly_usage_by_product"] = json!({ "product_families": ["synthetics_api"] });

        let config = SourceConfig::from_value(&value).unwrap();
        assert_eq!(
            config.hourly_usage().unwrap().product_families,
            vec!["synthetics_api"]
        );
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let err = SourceConfig::from_value(&json!({"site": "datadoghq.com"})).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("api_key"));

        let mut value = base_config();
        value["application_key"] = json!("  ");
        let err = SourceConfig::from_value(&value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required config field: application_key"
        );
    }

    #[test]
    fn test_product_families_required_for_hourly_usage() {
        let config = SourceConfig::from_value(&base_config()).unwrap();
        let err = config.hourly_usage().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));

        let mut value = base_config();
        value["hourly_usage_by_product"] = json!({ "product_families": [] });
        let config = SourceConfig::from_value(&value).unwrap();
        assert!(config.hourly_usage().is_err());
    }

    #[test]
    fn test_invalid_start_date() {
        let mut value = base_config();
        value["hourly_usage_by_product"] = json!({
            "product_families": ["all"],
            "start_date": "yesterday"
        });
        let config = SourceConfig::from_value(&value).unwrap();
        let err = config.hourly_usage().unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_base_url_override_and_timeout() {
        let mut value = base_config();
        value["base_url"] = json!("http://127.0.0.1:8080/");
        value["timeout_seconds"] = json!(5);

        let config = SourceConfig::from_value(&value).unwrap();
        assert_eq!(config.api_base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.timeout(), Duration::from_secs(5));

        value["base_url"] = json!("not a url");
        assert!(SourceConfig::from_value(&value).is_err());

        value["base_url"] = Value::Null;
        value["timeout_seconds"] = json!(0);
        assert!(SourceConfig::from_value(&value).is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = SourceConfig::from_value(&base_config()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("test_api_key"));
        assert!(!debug.contains("test_app_key"));
        assert!(debug.contains("datadoghq.com"));
    }

    #[test]
    fn test_load_config_file_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, base_config().to_string()).unwrap();
        let loaded = load_config_file(&json_path).unwrap();
        assert_eq!(loaded["site"], "datadoghq.com");

        let yaml_path = dir.path().join("config.yaml");
        std::fs::write(
            &yaml_path,
            "api_key: a\napplication_key: b\nsite: datadoghq.eu\n",
        )
        .unwrap();
        let loaded = load_config_file(&yaml_path).unwrap();
        assert_eq!(loaded["site"], "datadoghq.eu");
    }
}
