//! Index check error types

use thiserror::Error;

use crate::executor::StoreError;

#[derive(Debug, Error)]
pub enum IndexCheckError {
    #[error("Invalid collection spec {path}: {reason}")]
    InvalidSpec { path: String, reason: String },

    #[error("I/O error at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IndexCheckError {
    pub fn code(&self) -> &'static str {
        match self {
            IndexCheckError::InvalidSpec { .. } => "SQ_INVALID_COLLECTION_SPEC",
            IndexCheckError::Io { .. } => "SQ_COLLECTION_SPEC_IO",
            IndexCheckError::Store(_) => "SQ_EXECUTION_FAILED",
        }
    }
}

pub type IndexCheckResult<T> = Result<T, IndexCheckError>;
