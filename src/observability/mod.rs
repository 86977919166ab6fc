//! Observability for stored query execution
//!
//! - Structured JSON log lines
//! - Monotonic query counters
//! - Per-execution scopes with a request id
//!
//! Observability is read-only: nothing here affects query results.
//!
//! ```ignore
//! use stored_query::observability::{Logger, QueryScope};
//!
//! Logger::info("REGISTRY_RELOADED", &[("templates", "3")]);
//!
//! let scope = QueryScope::start("taxonomy_search_species_strain_no_sort");
//! // ... run the query ...
//! scope.complete(5, 12);
//! ```

mod logger;
mod metrics;
mod scope;

pub use logger::{LogTarget, Logger, Severity};
pub use metrics::{MetricsSnapshot, QueryMetrics};
pub use scope::QueryScope;
