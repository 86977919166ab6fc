//! Collection index checks
//!
//! Compares the indexes declared in collection spec files with the indexes
//! the store reports, and names every declared index the store lacks.

mod ensure;
mod errors;
mod spec;

pub use ensure::{ensure_indexes, index_name, EnsureReport};
pub use errors::{IndexCheckError, IndexCheckResult};
pub use spec::{load_collection_specs, CollectionSpec};
