//! Stored Query Execution Tests
//!
//! End-to-end behaviour of `taxonomy_search_species_strain_no_sort`:
//! - Pagination defaults and fallbacks
//! - Versioning (`ts`) filter
//! - Species/strain domain filter
//! - Projection
//! - Store order preserved
//! - Validation happens before the store is touched

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use stored_query::executor::{MemoryStore, ResultSet};
use stored_query::registry::{builtin_templates, RegistrySnapshot, TemplateRegistry};
use stored_query::service::{ErrorKind, QueryService};

const TEMPLATE: &str = "taxonomy_search_species_strain_no_sort";

// =============================================================================
// Helper Functions
// =============================================================================

fn store() -> Arc<MemoryStore> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ncbi_taxon.jsonl");
    Arc::new(MemoryStore::load_jsonl(&path).unwrap())
}

fn service_with(store: Arc<MemoryStore>) -> QueryService {
    let snapshot = RegistrySnapshot::from_templates(builtin_templates().unwrap()).unwrap();
    QueryService::new(Arc::new(TemplateRegistry::from_snapshot(snapshot)), store)
}

fn service() -> QueryService {
    service_with(store())
}

fn params(search_text: &str, extra: Value) -> Value {
    let mut params = json!({
        "@taxon_coll": "ncbi_taxon",
        "sciname_field": "scientific_name",
        "search_text": search_text
    });
    if let (Some(p), Value::Object(e)) = (params.as_object_mut(), extra) {
        p.extend(e);
    }
    params
}

fn ids(result: &ResultSet) -> Vec<String> {
    result
        .results
        .iter()
        .map(|doc| doc["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Reference Scenarios
// =============================================================================

/// A limit of 5 returns at most 5 matching documents.
#[tokio::test]
async fn test_limit_five() {
    let result = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"limit": 5})))
        .await
        .unwrap();

    assert_eq!(result.count, 5);
    assert_eq!(ids(&result), vec!["562", "83333", "511145", "564", "2725997"]);
    assert!(result.stats.limit_applied);
}

/// offset above the declared maximum is rejected before execution.
#[tokio::test]
async fn test_offset_out_of_range() {
    let service = service();
    let err = service
        .execute(TEMPLATE, &params("Escherichia", json!({"offset": 100001})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    let details = err.details().unwrap();
    assert_eq!(details.param, "offset");
    assert_eq!(details.expected, "<= 100000");
    assert_eq!(details.actual, "100001");
    assert_eq!(service.metrics().documents_scanned, 0);
}

/// Undeclared parameters are rejected.
#[tokio::test]
async fn test_unknown_parameter() {
    let err = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"foo": "bar"})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownParameter);
    assert_eq!(err.details().unwrap().param, "foo");
    assert_eq!(err.status_code(), 400);
}

// =============================================================================
// Pagination Tests
// =============================================================================

/// Omitted limit and offset use 20 and 0.
#[tokio::test]
async fn test_default_page() {
    let service = service();
    let result = service
        .execute(TEMPLATE, &params("Escherichia", json!({})))
        .await
        .unwrap();

    assert_eq!(result.count, 7);
    assert!(!result.stats.limit_applied);

    let bound = service
        .prepare(TEMPLATE, &params("Escherichia", json!({})))
        .unwrap();
    assert_eq!(bound.page(), Some((0, 20)));
}

/// A supplied 0 limit means the default of 20, not an empty page.
#[tokio::test]
async fn test_zero_limit_means_default() {
    let result = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"limit": 0, "offset": 0})))
        .await
        .unwrap();

    assert_eq!(result.count, 7);
}

/// Offset skips matching documents, not scanned ones.
#[tokio::test]
async fn test_offset_window() {
    let result = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"offset": 2, "limit": 2})))
        .await
        .unwrap();

    assert_eq!(ids(&result), vec!["511145", "564"]);
}

/// limit above the declared maximum is rejected.
#[tokio::test]
async fn test_limit_out_of_range() {
    let err = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"limit": 1001})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OutOfRange);
}

// =============================================================================
// Filter Tests
// =============================================================================

/// Every result is a species or a strain.
#[tokio::test]
async fn test_domain_filter_holds() {
    let result = service()
        .execute(TEMPLATE, &params("Escherichia", json!({})))
        .await
        .unwrap();

    for doc in &result.results {
        let rank = doc["rank"].as_str().unwrap_or_default();
        let strain = doc.get("strain").and_then(Value::as_bool).unwrap_or(false);
        assert!(rank == "species" || rank == "strain" || strain, "{:?}", doc);
    }
    assert!(!ids(&result).contains(&"561".to_string()));
    assert!(!ids(&result).contains(&"316435".to_string()));
}

/// A non-null ts keeps only versions alive at ts.
#[tokio::test]
async fn test_versioning_filter() {
    let ts = 1_550_000_000_000i64;
    let result = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"ts": ts})))
        .await
        .unwrap();

    assert_eq!(ids(&result), vec!["562", "83333", "511145", "208962", "1499973"]);
    for doc in &result.results {
        assert!(doc["created"].as_i64().unwrap() <= ts);
        assert!(doc["expired"].as_i64().unwrap() >= ts);
    }
}

/// A null ts disables versioning.
#[tokio::test]
async fn test_null_ts_disables_versioning() {
    let result = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"ts": null})))
        .await
        .unwrap();

    assert!(ids(&result).contains(&"564".to_string()));
    assert!(ids(&result).contains(&"2725997".to_string()));
}

// =============================================================================
// Search Tests
// =============================================================================

/// All tokens must prefix-match; results keep store order.
#[tokio::test]
async fn test_multi_token_search() {
    let result = service()
        .execute(TEMPLATE, &params("coli K-12", json!({})))
        .await
        .unwrap();

    assert_eq!(ids(&result), vec!["83333", "511145"]);
}

/// Search is case-insensitive and ignores punctuation.
#[tokio::test]
async fn test_search_normalization() {
    let lower = service()
        .execute(TEMPLATE, &params("e. coli", json!({})))
        .await
        .unwrap();
    let upper = service()
        .execute(TEMPLATE, &params("E. COLI", json!({})))
        .await
        .unwrap();

    assert_eq!(ids(&lower), vec!["562", "83333", "511145"]);
    assert_eq!(ids(&lower), ids(&upper));
}

/// Commas between words separate search terms.
#[tokio::test]
async fn test_search_comma_separated_terms() {
    let leading = service()
        .execute(TEMPLATE, &params(",escherichia", json!({"limit": 2})))
        .await
        .unwrap();
    assert_eq!(ids(&leading), vec!["562", "83333"]);

    let joined = service()
        .execute(TEMPLATE, &params("escherichia,coli", json!({})))
        .await
        .unwrap();
    assert_eq!(ids(&joined), vec!["562", "83333", "511145"]);

    let strain = service()
        .execute(TEMPLATE, &params("coli,K-12", json!({})))
        .await
        .unwrap();
    assert_eq!(ids(&strain), vec!["83333", "511145"]);
}

/// Search text with no tokens fails in the store.
#[tokio::test]
async fn test_empty_search_text() {
    let err = service()
        .execute(TEMPLATE, &params(" ... ", json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExecutionError);
}

// =============================================================================
// Projection Tests
// =============================================================================

/// select as a list keeps only the listed attributes.
#[tokio::test]
async fn test_select_list() {
    let result = service()
        .execute(
            TEMPLATE,
            &params("Escherichia", json!({"select": ["id", "scientific_name"], "limit": 2})),
        )
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&result.results).unwrap(),
        json!([
            {"id": "562", "scientific_name": "Escherichia coli"},
            {"id": "83333", "scientific_name": "Escherichia coli K-12"}
        ])
    );
}

/// select as a single string projects one attribute.
#[tokio::test]
async fn test_select_string() {
    let result = service()
        .execute(TEMPLATE, &params("Bacillus", json!({"select": "rank"})))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&result.results).unwrap(),
        json!([{"rank": "species"}, {"rank": "no rank"}])
    );
}

/// Unknown attributes in select are simply absent.
#[tokio::test]
async fn test_select_missing_attribute() {
    let result = service()
        .execute(
            TEMPLATE,
            &params("Bacillus", json!({"select": ["id", "lineage"], "limit": 1})),
        )
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&result.results).unwrap(),
        json!([{"id": "1423"}])
    );
}

// =============================================================================
// Validation Tests
// =============================================================================

/// Missing required parameters are rejected.
#[tokio::test]
async fn test_missing_search_text() {
    let err = service()
        .execute(
            TEMPLATE,
            &json!({"@taxon_coll": "ncbi_taxon", "sciname_field": "scientific_name"}),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingParameter);
    assert_eq!(err.details().unwrap().param, "search_text");
}

/// Wrong types are rejected with the declared union.
#[tokio::test]
async fn test_type_mismatch() {
    let err = service()
        .execute(TEMPLATE, &params("Escherichia", json!({"ts": "yesterday"})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.details().unwrap().expected, "integer | null");
}

/// Collection references must be identifiers.
#[tokio::test]
async fn test_bad_collection_reference() {
    let mut p = params("Escherichia", json!({}));
    p["@taxon_coll"] = json!("ncbi_taxon RETURN 1");

    let err = service().execute(TEMPLATE, &p).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

/// Unknown stored query names are not found.
#[tokio::test]
async fn test_unknown_template() {
    let err = service()
        .execute("taxonomy_search_species", &params("Escherichia", json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_json()["code"], "SQ_TEMPLATE_NOT_FOUND");
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Same parameters, same data, same results.
#[tokio::test]
async fn test_execution_is_deterministic() {
    let service = service();
    let p = params("Escherichia", json!({"limit": 4}));
    let first = service.execute(TEMPLATE, &p).await.unwrap();

    for _ in 0..20 {
        let next = service.execute(TEMPLATE, &p).await.unwrap();
        assert_eq!(next.results, first.results);
    }
}
