//! Tests for the Datadog streams

use super::*;
use crate::config::{HourlyUsageConfig, SourceConfig};
use crate::error::Error;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn credentials() -> ApiCredentials {
    ApiCredentials::new("test_api_key", "test_app_key")
}

fn hourly_stream(start_date: Option<&str>) -> HourlyUsageByProductStream {
    HourlyUsageByProductStream::new(
        credentials(),
        "https://api.datadoghq.com",
        HourlyUsageConfig {
            product_families: vec!["all".to_string()],
            start_date: start_date.map(String::from),
        },
    )
}

fn cost_stream(date: &str) -> EstimatedCostStream {
    let today = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    EstimatedCostStream::new(credentials(), "https://api.datadoghq.com")
        .with_clock(Arc::new(FixedClock(today)))
}

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// Hourly Usage: Properties
// ============================================================================

#[test]
fn test_hourly_usage_stream_properties() {
    let stream = hourly_stream(Some("2024-01-01T00"));

    assert_eq!(stream.name(), "hourly_usage_by_product");
    assert_eq!(stream.url_base(), "https://api.datadoghq.com");
    assert_eq!(stream.path(), "/api/v2/usage/hourly_usage");
    assert_eq!(
        stream.url(),
        "https://api.datadoghq.com/api/v2/usage/hourly_usage"
    );
    assert_eq!(stream.primary_key(), vec!["timestamp", "product_family"]);
    assert_eq!(stream.cursor_field(), "timestamp");
    assert!(stream.supports_incremental());

    let headers = stream.request_headers();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers["DD-API-KEY"], "test_api_key");
    assert_eq!(headers["DD-APPLICATION-KEY"], "test_app_key");
}

#[test]
fn test_hourly_usage_from_config() {
    let config = SourceConfig::from_value(&json!({
        "api_key": "k",
        "application_key": "a",
        "site": "datadoghq.eu",
        "hourly_usage_by_product": {
            "product_families": ["infra_hosts", "analyzed_logs"],
            "start_date": "2024-01-01T00"
        }
    }))
    .unwrap();

    let stream = HourlyUsageByProductStream::from_config(&config).unwrap();
    assert_eq!(stream.url_base(), "https://api.datadoghq.eu");
    assert_eq!(stream.product_families(), ["infra_hosts", "analyzed_logs"]);
    assert_eq!(stream.start_date(), Some("2024-01-01T00"));
}

// ============================================================================
// Hourly Usage: Request Params
// ============================================================================

#[test]
fn test_hourly_usage_params_initial_sync_without_floor() {
    let stream = hourly_stream(None);
    assert_eq!(
        stream.request_params(&StreamState::new(), None),
        params(&[("filter[product_families]", "all"), ("page[limit]", "500")])
    );
}

#[test]
fn test_hourly_usage_params_initial_sync_uses_floor() {
    let stream = hourly_stream(Some("2024-01-01T00"));
    assert_eq!(
        stream.request_params(&StreamState::new(), None),
        params(&[
            ("filter[product_families]", "all"),
            ("page[limit]", "500"),
            ("filter[timestamp][start]", "2024-01-01T00"),
        ])
    );
}

#[test]
fn test_hourly_usage_params_watermark_overrides_floor() {
    let stream = hourly_stream(Some("2024-01-01T00"));
    let state = StreamState::with_cursor("timestamp", "2024-03-19T00:00:00Z");
    assert_eq!(
        stream.request_params(&state, None),
        params(&[
            ("filter[product_families]", "all"),
            ("page[limit]", "500"),
            ("filter[timestamp][start]", "2024-03-19T00:00:00Z"),
        ])
    );
}

#[test]
fn test_hourly_usage_params_joins_families_and_merges_token() {
    let stream = HourlyUsageByProductStream::new(
        credentials(),
        "https://api.datadoghq.com",
        HourlyUsageConfig {
            product_families: vec!["infra_hosts".to_string(), "analyzed_logs".to_string()],
            start_date: None,
        },
    );
    let token = PageToken::new("next_record_id", "X");

    assert_eq!(
        stream.request_params(&StreamState::new(), Some(&token)),
        params(&[
            ("filter[product_families]", "infra_hosts,analyzed_logs"),
            ("page[limit]", "500"),
            ("next_record_id", "X"),
        ])
    );
}

// ============================================================================
// Hourly Usage: Extraction
// ============================================================================

fn hourly_usage_page() -> Value {
    json!({
        "data": [
            {
                "attributes": {
                    "account_name": "test_account",
                    "account_public_id": "abc123",
                    "measurements": [
                        {"usage_type": "host_count", "value": 100},
                        {"usage_type": "container_count", "value": null}
                    ],
                    "org_name": "test_org",
                    "product_family": "infra_hosts",
                    "public_id": "def456",
                    "region": "us1",
                    "timestamp": "2019-09-19T10:00:00.000Z"
                },
                "id": "6564d4299b5ac14acd51b709",
                "type": "usage_timeseries"
            }
        ],
        "meta": {"pagination": {"next_record_id": "next_page_token"}}
    })
}

#[test]
fn test_hourly_usage_extract() {
    let stream = hourly_stream(None);
    let records = stream.extract(&hourly_usage_page()).unwrap();

    assert_eq!(
        Value::Array(records.into_iter().map(Value::Object).collect()),
        json!([{
            "timestamp": "2019-09-19T10:00:00.000Z",
            "product_family": "infra_hosts",
            "org_name": "test_org",
            "measurements": [{"usage_type": "host_count", "value": 100}],
            "type": "usage_timeseries"
        }])
    );
}

#[test]
fn test_hourly_usage_extract_is_idempotent() {
    let stream = hourly_stream(None);
    let body = hourly_usage_page();

    let first = serde_json::to_string(&stream.extract(&body).unwrap()).unwrap();
    let second = serde_json::to_string(&stream.extract(&body).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_hourly_usage_extract_empty_page() {
    let stream = hourly_stream(None);
    assert!(stream.extract(&json!({"data": []})).unwrap().is_empty());
    assert!(stream.extract(&json!({"meta": {}})).unwrap().is_empty());
}

#[test]
fn test_hourly_usage_extract_missing_required_field_fails() {
    let stream = hourly_stream(None);
    let body = json!({
        "data": [
            {
                "attributes": {"org_name": "o", "product_family": "infra_hosts", "timestamp": "t"},
                "type": "usage_timeseries"
            },
            {
                "attributes": {"org_name": "o", "timestamp": "t"},
                "type": "usage_timeseries"
            }
        ]
    });

    let err = stream.extract(&body).unwrap_err();
    match err {
        Error::RecordExtraction { stream, message } => {
            assert_eq!(stream, "hourly_usage_by_product");
            assert!(message.contains("product_family"));
        }
        other => panic!("Expected RecordExtraction, got {other:?}"),
    }
}

#[test]
fn test_hourly_usage_extract_rejects_non_array_data() {
    let stream = hourly_stream(None);
    assert!(stream.extract(&json!({"data": {"oops": true}})).is_err());
}

// ============================================================================
// Estimated Cost
// ============================================================================

fn estimated_cost_page() -> Value {
    json!({
        "data": [
            {
                "attributes": {
                    "account_name": "test_account",
                    "charges": [
                        {
                            "charge_type": "committed",
                            "cost": 10.5,
                            "last_aggregation_function": "sum",
                            "product_name": "apm_fargate"
                        },
                        {
                            "charge_type": "on_demand",
                            "cost": 2.25,
                            "last_aggregation_function": "sum",
                            "product_name": "apm_fargate"
                        },
                        {
                            "charge_type": "total",
                            "cost": 1,
                            "last_aggregation_function": "cumsum",
                            "product_name": "siem"
                        }
                    ],
                    "date": "2024-10-01T00:00:00Z",
                    "org_name": "test_org",
                    "public_id": "abc123",
                    "region": "us",
                    "total_cost": 13.75
                },
                "id": "cost-1",
                "type": "cost_by_org"
            }
        ]
    })
}

#[test]
fn test_estimated_cost_stream_properties() {
    let stream = cost_stream("2024-10-15");
    assert_eq!(stream.name(), "estimated_cost");
    assert_eq!(stream.path(), "/api/v2/usage/estimated_cost");
    assert_eq!(stream.primary_key(), vec!["sync_date", "month"]);
    assert_eq!(stream.cursor_field(), "sync_date");
    assert_eq!(stream.request_headers()["DD-API-KEY"], "test_api_key");
}

#[test]
fn test_estimated_cost_params_use_current_month() {
    let stream = cost_stream("2024-10-15");
    let state = StreamState::with_cursor("sync_date", "2023-01-01");

    assert_eq!(
        stream.request_params(&state, None),
        params(&[("start_month", "2024-10")])
    );
    assert_eq!(
        stream.request_params(&StreamState::new(), Some(&PageToken::new("next_record_id", "n"))),
        params(&[("start_month", "2024-10"), ("next_record_id", "n")])
    );
}

#[test]
fn test_estimated_cost_extract() {
    let stream = cost_stream("2024-10-15");
    let records = stream.extract(&estimated_cost_page()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        Value::Object(records[0].clone()),
        json!({
            "sync_date": "2024-10-15",
            "month": "2024-10",
            "org_name": "test_org",
            "total_cost": 13.75,
            "charges": [
                {
                    "product_name": "apm_fargate",
                    "charge_type": "committed",
                    "cost": 10.5,
                    "last_aggregation_function": "sum"
                },
                {
                    "product_name": "apm_fargate",
                    "charge_type": "on_demand",
                    "cost": 2.25,
                    "last_aggregation_function": "sum"
                },
                {
                    "product_name": "siem",
                    "charge_type": "total",
                    "cost": 1,
                    "last_aggregation_function": "cumsum"
                }
            ]
        })
    );
}

#[test]
fn test_estimated_cost_extract_missing_total_cost_fails() {
    let stream = cost_stream("2024-10-15");
    let body = json!({"data": [{"attributes": {"org_name": "o", "charges": []}}]});

    let err = stream.extract(&body).unwrap_err();
    assert!(err.to_string().contains("total_cost"));
}

#[test]
fn test_estimated_cost_extract_missing_charges_fails() {
    let stream = cost_stream("2024-10-15");
    let body = json!({"data": [{"attributes": {"org_name": "o", "total_cost": 1.0}}]});

    let err = stream.extract(&body).unwrap_err();
    match err {
        Error::RecordExtraction { stream, message } => {
            assert_eq!(stream, "estimated_cost");
            assert!(message.contains("charges"));
        }
        other => panic!("Expected RecordExtraction, got {other:?}"),
    }
}

#[test]
fn test_estimated_cost_extract_charge_without_aggregation_fails() {
    let stream = cost_stream("2024-10-15");
    let body = json!({
        "data": [{
            "attributes": {
                "org_name": "o",
                "total_cost": 1.0,
                "charges": [{"product_name": "siem", "charge_type": "total", "cost": 1.0}]
            }
        }]
    });

    let err = stream.extract(&body).unwrap_err();
    assert!(err.to_string().contains("last_aggregation_function"));
}

#[test]
fn test_estimated_cost_extract_is_idempotent() {
    let stream = cost_stream("2024-10-15");
    let body = estimated_cost_page();
    assert_eq!(stream.extract(&body).unwrap(), stream.extract(&body).unwrap());
}
