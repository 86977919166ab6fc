//! Query Executor subsystem
//!
//! Runs bound stored queries against a `DocumentStore`.
//!
//! # Execution Flow (strict order)
//!
//! 1. Fulltext search, results in store order
//! 2. Temporal version filter
//! 3. Domain filters
//! 4. Pagination
//! 5. Projection

mod errors;
mod executor;
mod filters;
mod fulltext;
mod memory;
mod result;
mod store;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::QueryExecutor;
pub use filters::{is_truthy, DocumentFilter};
pub use fulltext::{build_expression, tokenize};
pub use memory::MemoryStore;
pub use result::{ExecutionStats, ResultSet};
pub use store::{
    Document, DocumentStore, DocumentStream, FulltextRequest, IndexInfo, StoreError, StoreResult,
};
