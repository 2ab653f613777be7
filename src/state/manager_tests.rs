//! Tests for StateManager

use super::*;
use tempfile::tempdir;

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_from_file() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("state.json")).unwrap();
    assert!(!manager.is_in_memory());
}

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_from_json() {
    let manager = StateManager::from_json(
        r#"{"streams": {"hourly_usage_by_product": {"timestamp": "2024-03-19T00:00:00Z"}}}"#,
    )
    .unwrap();

    assert!(manager.is_in_memory());
    assert_eq!(
        manager
            .get_stream_state("hourly_usage_by_product")
            .await
            .get("timestamp"),
        Some("2024-03-19T00:00:00Z")
    );
}

#[test]
fn test_from_json_empty_and_invalid() {
    assert!(StateManager::from_json("").is_ok());
    assert!(StateManager::from_json("{ invalid json }").is_err());
}

// ============================================================================
// Stream State Tests
// ============================================================================

#[tokio::test]
async fn test_get_set_stream_state() {
    let manager = StateManager::in_memory();

    assert!(manager.get_stream_state("estimated_cost").await.is_empty());

    manager
        .set_stream_state(
            "estimated_cost",
            StreamState::with_cursor("sync_date", "2024-10-15"),
        )
        .await
        .unwrap();

    assert_eq!(
        manager.get_stream_state("estimated_cost").await.get("sync_date"),
        Some("2024-10-15")
    );
}

#[tokio::test]
async fn test_streams_are_independent() {
    let manager = StateManager::in_memory();

    manager
        .set_stream_state(
            "hourly_usage_by_product",
            StreamState::with_cursor("timestamp", "2024-03-20T00:00:00Z"),
        )
        .await
        .unwrap();
    manager
        .set_stream_state(
            "estimated_cost",
            StreamState::with_cursor("sync_date", "2024-10-15"),
        )
        .await
        .unwrap();

    assert_eq!(
        manager.get_stream_state("estimated_cost").await.get("sync_date"),
        Some("2024-10-15")
    );
    assert_eq!(
        manager
            .get_stream_state("hourly_usage_by_product")
            .await
            .get("timestamp"),
        Some("2024-03-20T00:00:00Z")
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager
        .set_stream_state(
            "hourly_usage_by_product",
            StreamState::with_cursor("timestamp", "2024-03-20T00:00:00Z"),
        )
        .await
        .unwrap();
    assert!(path.exists());

    let manager2 = StateManager::from_file(&path).unwrap();
    assert_eq!(manager2.snapshot().await, manager.snapshot().await);
}

#[tokio::test]
async fn test_from_file_missing_is_empty() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("nonexistent.json")).unwrap();
    assert!(manager.snapshot().await.streams.is_empty());
}

#[tokio::test]
async fn test_set_stream_state_persists_atomically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("auto_state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager
        .set_stream_state(
            "estimated_cost",
            StreamState::with_cursor("sync_date", "2024-10-15"),
        )
        .await
        .unwrap();

    let manager2 = StateManager::from_file(&path).unwrap();
    assert_eq!(
        manager2.get_stream_state("estimated_cost").await.get("sync_date"),
        Some("2024-10-15")
    );
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_save_in_memory_noop() {
    let manager = StateManager::in_memory();
    manager
        .set_stream_state("estimated_cost", StreamState::with_cursor("sync_date", "x"))
        .await
        .unwrap();
    manager.save().await.unwrap();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_load_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    tokio::fs::write(&path, "{ invalid json }").await.unwrap();

    assert!(StateManager::from_file(&path).is_err());
}
