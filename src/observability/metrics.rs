//! Query counters
//!
//! Counters only, monotonic, reset on process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for stored query execution
#[derive(Debug, Default)]
pub struct QueryMetrics {
    /// Successful executions
    queries_executed: AtomicU64,
    /// Requests rejected before reaching the store
    queries_rejected: AtomicU64,
    /// Store-level failures
    queries_failed: AtomicU64,
    /// Executions that hit the timeout
    queries_timed_out: AtomicU64,
    /// Documents returned across all executions
    documents_returned: AtomicU64,
    /// Documents pulled from the store across all executions
    documents_scanned: AtomicU64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful execution
    pub fn record_executed(&self, returned: usize, scanned: usize) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
        self.documents_returned
            .fetch_add(returned as u64, Ordering::Relaxed);
        self.documents_scanned
            .fetch_add(scanned as u64, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_timed_out(&self) {
        self.queries_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            queries_timed_out: self.queries_timed_out.load(Ordering::Relaxed),
            documents_returned: self.documents_returned.load(Ordering::Relaxed),
            documents_scanned: self.documents_scanned.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub queries_failed: u64,
    pub queries_timed_out: u64,
    pub documents_returned: u64,
    pub documents_scanned: u64,
}
