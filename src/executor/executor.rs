//! Stored query executor
//!
//! Execution flow (strict order):
//! 1. Build the fulltext expression and open a store cursor
//! 2. Drop documents outside the `ts` version window
//! 3. Drop documents failing the domain filters
//! 4. Skip `offset`, take `limit`, stop pulling once the page is full
//! 5. Project selected attributes
//!
//! Results keep the store's order. Nothing is retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;

use crate::binder::{BoundQuery, BoundStage};

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::DocumentFilter;
use super::fulltext::build_expression;
use super::result::{ExecutionStats, ResultSet};
use super::store::{Document, DocumentStore, FulltextRequest};

/// Runs bound stored queries against a document store
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn DocumentStore>,
}

impl QueryExecutor {
    /// Creates a new executor
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Executes a bound query.
    pub async fn run(&self, bound: &BoundQuery) -> ExecutorResult<ResultSet> {
        let started = Instant::now();

        let (collection, field, text) = bound.search().ok_or_else(|| {
            ExecutorError::execution_failed(format!("'{}' has no search stage", bound.name()))
        })?;
        let request = FulltextRequest {
            collection: collection.to_string(),
            field: field.to_string(),
            expression: build_expression(text),
        };

        let (offset, limit) = match bound.page() {
            Some((offset, limit)) => (offset, Some(limit)),
            None => (0, None),
        };

        let mut cursor = self.store.fulltext(&request).await?;
        let mut stats = ExecutionStats::default();
        let mut skipped = 0u64;
        let mut page = Vec::new();

        loop {
            if limit.map_or(false, |limit| page.len() as u64 >= limit) {
                stats.limit_applied = true;
                break;
            }
            let Some(next) = cursor.next().await else {
                break;
            };
            let doc = next?;
            stats.scanned += 1;

            if !Self::passes(&doc, &bound.stages) {
                stats.filtered += 1;
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            page.push(doc);
        }
        drop(cursor);

        let results = match Self::selection(&bound.stages) {
            Some(select) => page
                .into_iter()
                .map(|doc| DocumentFilter::project(doc, select))
                .collect(),
            None => page,
        };

        stats.returned = results.len();
        stats.elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(ResultSet::new(results, stats))
    }

    /// Executes a bound query, abandoning it after `limit`.
    ///
    /// On timeout the in-flight cursor is dropped, which releases it.
    pub async fn run_with_timeout(
        &self,
        bound: &BoundQuery,
        limit: Duration,
    ) -> ExecutorResult<ResultSet> {
        tokio::time::timeout(limit, self.run(bound))
            .await
            .map_err(|_| ExecutorError::timeout(limit))?
    }

    fn passes(doc: &Document, stages: &[BoundStage]) -> bool {
        stages.iter().all(|stage| match stage {
            BoundStage::Temporal { ts: Some(ts) } => DocumentFilter::is_current(doc, *ts),
            BoundStage::Filter(filter) => DocumentFilter::matches(doc, filter),
            _ => true,
        })
    }

    fn selection(stages: &[BoundStage]) -> Option<&[String]> {
        stages.iter().find_map(|stage| match stage {
            BoundStage::Project {
                select: Some(select),
            } => Some(select.as_slice()),
            _ => None,
        })
    }
}
