//! Document store seam
//!
//! The executor only needs a fulltext primitive returning documents lazily in
//! relevance order. The returned stream owns the store cursor: dropping the
//! stream releases it.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored document: housekeeping `created`/`expired` plus attributes
pub type Document = Map<String, Value>;

/// Lazy, cursor-owning result sequence
pub type DocumentStream = BoxStream<'static, StoreResult<Document>>;

/// Store-level failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("no fulltext index on {collection}.{field}")]
    IndexNotFound { collection: String, field: String },

    #[error("invalid fulltext expression: {0}")]
    InvalidExpression(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("malformed data at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A fulltext lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulltextRequest {
    pub collection: String,
    pub field: String,
    /// Comma-joined terms, e.g. `prefix:escherichia,prefix:coli`
    pub expression: String,
}

/// An index as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub fields: Vec<String>,
    /// Remaining index attributes (`unique`, `minLength`, ...)
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl IndexInfo {
    pub fn new(kind: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            kind: kind.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// True when every attribute of `self` has the same value in `other`
    pub fn is_subset_of(&self, other: &IndexInfo) -> bool {
        self.kind == other.kind
            && self.fields == other.fields
            && self
                .options
                .iter()
                .all(|(key, value)| other.options.get(key) == Some(value))
    }

    pub fn fulltext(field: &str) -> Self {
        Self::new("fulltext", &[field])
    }
}

/// Backing store for stored query execution
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Opens a fulltext cursor over `collection.field`.
    async fn fulltext(&self, request: &FulltextRequest) -> StoreResult<DocumentStream>;

    /// Indexes of a collection, `None` when the collection does not exist.
    async fn indexes(&self, collection: &str) -> StoreResult<Option<Vec<IndexInfo>>>;
}
