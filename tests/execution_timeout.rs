//! Execution Timeout Tests
//!
//! - Timeouts surface as `Timeout` with a 504 status
//! - The store cursor is released on timeout and on cancellation
//! - Concurrent executions are independent

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use stored_query::executor::MemoryStore;
use stored_query::registry::{builtin_templates, RegistrySnapshot, TemplateRegistry};
use stored_query::service::{ErrorKind, QueryService};

const TEMPLATE: &str = "taxonomy_search_species_strain_no_sort";

// =============================================================================
// Helper Functions
// =============================================================================

fn slow_store(docs: usize, latency: Duration) -> Arc<MemoryStore> {
    let store = MemoryStore::new().with_latency(latency);
    store
        .ensure_fulltext_index("ncbi_taxon", "scientific_name")
        .unwrap();
    for i in 0..docs {
        let doc = json!({
            "id": i.to_string(),
            "scientific_name": format!("Escherichia coli isolate {}", i),
            "rank": "species"
        });
        if let Value::Object(map) = doc {
            store.insert("ncbi_taxon", map).unwrap();
        }
    }
    Arc::new(store)
}

fn service(store: Arc<MemoryStore>) -> QueryService {
    let snapshot = RegistrySnapshot::from_templates(builtin_templates().unwrap()).unwrap();
    QueryService::new(Arc::new(TemplateRegistry::from_snapshot(snapshot)), store)
}

fn params() -> Value {
    json!({
        "@taxon_coll": "ncbi_taxon",
        "sciname_field": "scientific_name",
        "search_text": "escherichia coli",
        "limit": 100
    })
}

// =============================================================================
// Timeout Tests
// =============================================================================

/// An execution past its deadline fails with Timeout and frees its cursor.
#[tokio::test]
async fn test_timeout_releases_cursor() {
    let store = slow_store(50, Duration::from_millis(20));
    let service = service(store.clone());

    let err = service
        .execute_with_timeout(TEMPLATE, &params(), Duration::from_millis(60))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.status_code(), 504);
    assert_eq!(err.code(), "SQ_EXECUTION_TIMEOUT");
    assert_eq!(store.open_cursors(), 0);
    assert_eq!(service.metrics().queries_timed_out, 1);
}

/// The service-wide deadline applies to execute().
#[tokio::test]
async fn test_service_timeout_applies() {
    let store = slow_store(50, Duration::from_millis(20));
    let service = service(store.clone()).with_timeout(Duration::from_millis(40));

    let err = service.execute(TEMPLATE, &params()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(store.open_cursors(), 0);
}

/// A generous deadline lets the query finish.
#[tokio::test]
async fn test_completes_within_deadline() {
    let store = slow_store(3, Duration::from_millis(1));
    let service = service(store.clone());

    let result = service
        .execute_with_timeout(TEMPLATE, &params(), Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(result.count, 3);
    assert_eq!(store.open_cursors(), 0);
}

/// Dropping an in-flight execution releases its cursor.
#[tokio::test]
async fn test_cancellation_releases_cursor() {
    let store = slow_store(50, Duration::from_millis(20));
    let service = Arc::new(service(store.clone()));

    let task = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.execute(TEMPLATE, &params()).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.open_cursors(), 1);

    task.abort();
    let _ = task.await;
    assert_eq!(store.open_cursors(), 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// Concurrent executions see the same results and all cursors close.
#[tokio::test]
async fn test_concurrent_executions() {
    let store = slow_store(10, Duration::from_millis(1));
    let service = Arc::new(service(store.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.execute(TEMPLATE, &params()).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.count, 10);
    }

    assert_eq!(store.open_cursors(), 0);
    assert_eq!(service.metrics().queries_executed, 8);
}
