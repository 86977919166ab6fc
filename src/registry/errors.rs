//! # Registry Errors

use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Template registry errors
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Stored query not found: {0}")]
    NotFound(String),

    #[error("Stored query already registered: {0}")]
    DuplicateTemplate(String),

    #[error("Invalid stored query '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("Failed to read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::InvalidTemplate {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::NotFound(_) => "SQ_TEMPLATE_NOT_FOUND",
            RegistryError::DuplicateTemplate(_) => "SQ_DUPLICATE_TEMPLATE",
            RegistryError::InvalidTemplate { .. } => "SQ_INVALID_TEMPLATE",
            RegistryError::Io { .. } => "SQ_TEMPLATE_IO",
            RegistryError::Internal(_) => "SQ_INTERNAL",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::NotFound(_) => 404,
            RegistryError::DuplicateTemplate(_) => 409,
            RegistryError::InvalidTemplate { .. } => 500,
            RegistryError::Io { .. } => 500,
            RegistryError::Internal(_) => 500,
        }
    }
}
