//! QueryScope for start/outcome logging of one execution
//!
//! - Logs `QUERY_START` on creation
//! - Logs exactly one outcome event when finished
//! - Logs `QUERY_CANCELLED` on drop if no outcome was recorded, which is
//!   what happens when the caller drops the execution future

use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::logger::Logger;

/// Tracks one stored query execution
pub struct QueryScope {
    request_id: Uuid,
    template: String,
    started_at: DateTime<Utc>,
    timer: Instant,
    finished: bool,
}

impl QueryScope {
    /// Open a scope and log `QUERY_START`
    pub fn start(template: &str) -> Self {
        let scope = Self {
            request_id: Uuid::new_v4(),
            template: template.to_string(),
            started_at: Utc::now(),
            timer: Instant::now(),
            finished: false,
        };
        let request_id = scope.request_id.to_string();
        let started_at = scope.started_at.to_rfc3339();
        Logger::info(
            "QUERY_START",
            &[
                ("request_id", &request_id),
                ("started_at", &started_at),
                ("template", template),
            ],
        );
        scope
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Milliseconds since the scope opened
    pub fn elapsed_ms(&self) -> u64 {
        self.timer.elapsed().as_millis() as u64
    }

    /// Log `QUERY_COMPLETE`
    pub fn complete(mut self, returned: usize, scanned: usize) {
        self.finished = true;
        let returned = returned.to_string();
        let scanned = scanned.to_string();
        self.emit_info("QUERY_COMPLETE", &[("returned", &returned), ("scanned", &scanned)]);
    }

    /// Log `QUERY_REJECTED` for requests stopped before the store
    pub fn reject(mut self, code: &str, reason: &str) {
        self.finished = true;
        self.emit_warn("QUERY_REJECTED", &[("code", code), ("reason", reason)]);
    }

    /// Log `QUERY_FAILED` (or `QUERY_TIMEOUT`)
    pub fn fail(mut self, code: &str, reason: &str, timed_out: bool) {
        self.finished = true;
        let event = if timed_out { "QUERY_TIMEOUT" } else { "QUERY_FAILED" };
        let request_id = self.request_id.to_string();
        let elapsed = self.elapsed_ms().to_string();
        Logger::error(
            event,
            &[
                ("code", code),
                ("elapsed_ms", &elapsed),
                ("reason", reason),
                ("request_id", &request_id),
                ("template", &self.template),
            ],
        );
    }

    fn emit_info(&self, event: &str, extra: &[(&str, &str)]) {
        let request_id = self.request_id.to_string();
        let elapsed = self.elapsed_ms().to_string();
        let mut fields = vec![
            ("elapsed_ms", elapsed.as_str()),
            ("request_id", request_id.as_str()),
            ("template", self.template.as_str()),
        ];
        fields.extend_from_slice(extra);
        Logger::info(event, &fields);
    }

    fn emit_warn(&self, event: &str, extra: &[(&str, &str)]) {
        let request_id = self.request_id.to_string();
        let mut fields = vec![
            ("request_id", request_id.as_str()),
            ("template", self.template.as_str()),
        ];
        fields.extend_from_slice(extra);
        Logger::warn(event, &fields);
    }
}

impl Drop for QueryScope {
    fn drop(&mut self) {
        if !self.finished {
            self.emit_warn("QUERY_CANCELLED", &[("reason", "dropped before completion")]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_ids_are_unique() {
        let a = QueryScope::start("t");
        let b = QueryScope::start("t");
        assert_ne!(a.request_id(), b.request_id());
        a.complete(0, 0);
        b.reject("SQ_MISSING_PARAMETER", "missing");
    }

    #[test]
    fn test_started_at_is_recent() {
        let scope = QueryScope::start("t");
        let age = Utc::now() - scope.started_at();
        assert!(age.num_seconds() < 5);
        scope.fail("SQ_EXECUTION_FAILED", "boom", false);
    }

    #[test]
    fn test_drop_without_outcome_does_not_panic() {
        let scope = QueryScope::start("t");
        drop(scope);
    }
}
