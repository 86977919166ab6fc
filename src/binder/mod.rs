//! Parameter binder for stored queries
//!
//! Turns validated parameters into a `BoundQuery`:
//! - bind vars keyed by placeholder, the query text is never rewritten
//! - collection references checked as identifiers
//! - pagination fallbacks applied for falsy values
//! - scalar or list `select` resolved into a projection

mod binder;
mod bound;

pub use binder::ParamBinder;
pub use bound::{BoundQuery, BoundStage};
