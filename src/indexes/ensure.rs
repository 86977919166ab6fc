//! Index ensure check
//!
//! A declared index is satisfied when its attributes are a subset of some
//! index the store reports on the same collection. A collection the store
//! does not have fails every index it declares.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::IndexCheckResult;
use super::spec::CollectionSpec;
use crate::executor::{DocumentStore, IndexInfo};
use crate::observability::Logger;

/// Outcome of an ensure check
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnsureReport {
    /// Failed index names, e.g. `ncbi_taxon/fulltext/['scientific_name']`
    pub failed_names: Vec<String>,
    /// Failed index specs by collection
    pub failed: BTreeMap<String, Vec<IndexInfo>>,
}

impl EnsureReport {
    pub fn is_ok(&self) -> bool {
        self.failed_names.is_empty()
    }
}

/// Formats an index as `coll/type/['field', ...]`
pub fn index_name(collection: &str, index: &IndexInfo) -> String {
    let fields = index
        .fields
        .iter()
        .map(|f| format!("'{}'", f))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}/{}/[{}]", collection, index.kind, fields)
}

/// Checks declared indexes against the store
pub async fn ensure_indexes(
    store: &dyn DocumentStore,
    specs: &[CollectionSpec],
) -> IndexCheckResult<EnsureReport> {
    let mut report = EnsureReport::default();

    for spec in specs.iter().filter(|s| !s.indexes.is_empty()) {
        let missing: Vec<IndexInfo> = match store.indexes(&spec.name).await? {
            None => spec.indexes.clone(),
            Some(server) => spec
                .indexes
                .iter()
                .filter(|local| !server.iter().any(|s| local.is_subset_of(s)))
                .cloned()
                .collect(),
        };

        for index in &missing {
            let name = index_name(&spec.name, index);
            Logger::warn("INDEX_MISSING", &[("index", &name)]);
            report.failed_names.push(name);
        }
        if !missing.is_empty() {
            report.failed.insert(spec.name.clone(), missing);
        }
    }

    if report.is_ok() {
        Logger::info("INDEXES_ENSURED", &[("collections", &specs.len().to_string())]);
    }
    Ok(report)
}
