//! # Stored Query Registry
//!
//! Named, schema-validated query templates registered ahead of time.
//! Templates are immutable once registered; the registry itself is an
//! atomically swapped snapshot so concurrent readers never observe a
//! partially updated set.

pub mod errors;
pub mod loader;
pub mod pipeline;
pub mod registry;
pub mod template;

pub use errors::{RegistryError, RegistryResult};
pub use loader::{builtin_templates, TemplateLoader};
pub use pipeline::{
    Condition, FilterStage, PaginateStage, ProjectStage, QueryPipeline, SearchStage, StageDef,
    TemporalStage,
};
pub use registry::{RegistrySnapshot, TemplateRegistry};
pub use template::{
    extract_placeholders, Placeholder, PlaceholderKind, QueryTemplate, TemplateDefinition,
};
