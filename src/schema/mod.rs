//! Parameter schemas and validation for stored queries
//!
//! Each stored query declares the parameters it accepts. Caller parameters
//! are checked against that contract before anything is bound or executed.
//!
//! # Rules
//!
//! - Unknown parameters rejected when additionalProperties is false
//! - Required parameters must be present
//! - Defaults fill absent optional parameters
//! - Type unions (e.g. `[integer, "null"]`) checked exactly, no coercion
//! - Array parameters accept a single scalar, normalized to a sequence
//! - Numeric bounds and enums enforced

mod errors;
mod types;
mod validator;

pub use errors::{SchemaResult, ValidationDetails, ValidationError, ValidationErrorCode};
pub use types::{ParamDef, ParamSchema, ParamType, ParamValue, TypeSet, ValidatedParams};
pub use validator::ParamValidator;
