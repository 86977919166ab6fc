//! Result types for query execution

use serde::Serialize;

use super::store::Document;

/// Execution counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionStats {
    /// Documents pulled from the store cursor
    pub scanned: usize,
    /// Documents dropped by temporal and domain filters
    pub filtered: usize,
    /// Documents returned
    pub returned: usize,
    /// Whether the page filled before the cursor ran out
    pub limit_applied: bool,
    pub elapsed_ms: u64,
}

/// Result of a stored query execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    /// Documents in store order
    pub results: Vec<Document>,
    pub count: usize,
    pub stats: ExecutionStats,
}

impl ResultSet {
    pub fn new(results: Vec<Document>, stats: ExecutionStats) -> Self {
        Self {
            count: results.len(),
            results,
            stats,
        }
    }

    /// Creates an empty result
    pub fn empty() -> Self {
        Self::new(Vec::new(), ExecutionStats::default())
    }

    /// Returns true if no documents matched
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Values of one attribute across results, `None` where absent
    pub fn column(&self, attribute: &str) -> Vec<Option<&serde_json::Value>> {
        self.results.iter().map(|doc| doc.get(attribute)).collect()
    }
}
