//! stored-query - named, schema-validated stored queries
//!
//! A stored query is registered ahead of time with a parameter schema, a
//! query body with named placeholders, and an execution pipeline. Callers
//! invoke it by name with a parameter object:
//!
//! 1. `registry` resolves the template
//! 2. `schema` validates the parameters
//! 3. `binder` binds them onto the pipeline
//! 4. `executor` runs the pipeline against a `DocumentStore`
//!
//! `service::QueryService` wires the steps together.

pub mod binder;
pub mod cli;
pub mod executor;
pub mod indexes;
pub mod observability;
pub mod registry;
pub mod schema;
pub mod service;
