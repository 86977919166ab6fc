//! Stored query service
//!
//! Single entry point for callers: `QueryService::execute(name, params)`.

mod errors;
mod service;

pub use errors::{ErrorKind, ServiceError, ServiceResult};
pub use service::{summarize, QueryService, TemplateSummary, DEFAULT_QUERY_TIMEOUT};
