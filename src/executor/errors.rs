//! Executor error types
//!
//! Error codes:
//! - SQ_EXECUTION_FAILED (store or pipeline failure)
//! - SQ_EXECUTION_TIMEOUT (deadline exceeded, cursor released)

use std::fmt;
use std::time::Duration;

use super::store::StoreError;

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Store or pipeline failure
    ExecutionFailed,
    /// Execution exceeded its deadline
    ExecutionTimeout,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::ExecutionFailed => "SQ_EXECUTION_FAILED",
            ExecutorErrorCode::ExecutionTimeout => "SQ_EXECUTION_TIMEOUT",
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message
    message: String,
    /// Deadline that was exceeded, for timeouts
    timeout: Option<Duration>,
}

impl ExecutorError {
    /// Create an execution failed error
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::ExecutionFailed,
            message: reason.into(),
            timeout: None,
        }
    }

    /// Create a timeout error
    pub fn timeout(limit: Duration) -> Self {
        Self {
            code: ExecutorErrorCode::ExecutionTimeout,
            message: format!("query exceeded {}ms", limit.as_millis()),
            timeout: Some(limit),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the exceeded deadline, if this is a timeout
    pub fn timeout_limit(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ExecutorErrorCode::ExecutionTimeout
    }
}

impl From<StoreError> for ExecutorError {
    fn from(err: StoreError) -> Self {
        Self::execution_failed(format!("store error: {}", err))
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
