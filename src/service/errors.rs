//! Service error types
//!
//! Service errors are pass-through: they keep the code, message and details
//! of the subsystem that raised them and add the caller-facing kind and
//! status.

use std::fmt;

use serde_json::{json, Value};

use crate::executor::ExecutorError;
use crate::registry::RegistryError;
use crate::schema::{ValidationDetails, ValidationError, ValidationErrorCode};

/// Caller-facing error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MissingParameter,
    TypeMismatch,
    OutOfRange,
    UnknownParameter,
    ExecutionError,
    Timeout,
    DuplicateTemplate,
    InvalidTemplate,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MissingParameter => "MissingParameter",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::OutOfRange => "OutOfRange",
            ErrorKind::UnknownParameter => "UnknownParameter",
            ErrorKind::ExecutionError => "ExecutionError",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::DuplicateTemplate => "DuplicateTemplate",
            ErrorKind::InvalidTemplate => "InvalidTemplate",
            ErrorKind::Internal => "Internal",
        }
    }

    /// HTTP-style status for the kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::MissingParameter
            | ErrorKind::TypeMismatch
            | ErrorKind::OutOfRange
            | ErrorKind::UnknownParameter => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::DuplicateTemplate => 409,
            ErrorKind::ExecutionError | ErrorKind::InvalidTemplate | ErrorKind::Internal => 500,
            ErrorKind::Timeout => 504,
        }
    }

    /// True for errors raised before the store was touched
    pub fn is_rejection(&self) -> bool {
        self.status_code() < 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned by `QueryService`
#[derive(Debug)]
pub struct ServiceError {
    kind: ErrorKind,
    /// Original error code string from the subsystem
    code: String,
    message: String,
    details: Option<ValidationDetails>,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Parameter, expected and actual for validation errors
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Response body: `{"error", "code", "kind"}` plus validation details
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.message,
            "code": self.code,
            "kind": self.kind.as_str(),
        });
        if let Some(details) = &self.details {
            body["param"] = json!(details.param);
            body["expected"] = json!(details.expected);
            body["actual"] = json!(details.actual);
        }
        body
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        let kind = match err.code() {
            ValidationErrorCode::MissingParameter => ErrorKind::MissingParameter,
            ValidationErrorCode::TypeMismatch => ErrorKind::TypeMismatch,
            ValidationErrorCode::OutOfRange => ErrorKind::OutOfRange,
            ValidationErrorCode::UnknownParameter => ErrorKind::UnknownParameter,
        };
        Self {
            kind,
            code: err.code().code().to_string(),
            message: err.message().to_string(),
            details: Some(err.details().clone()),
        }
    }
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        let kind = match &err {
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::DuplicateTemplate(_) => ErrorKind::DuplicateTemplate,
            RegistryError::InvalidTemplate { .. } | RegistryError::Io { .. } => {
                ErrorKind::InvalidTemplate
            }
            RegistryError::Internal(_) => ErrorKind::Internal,
        };
        Self {
            kind,
            code: err.code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

impl From<ExecutorError> for ServiceError {
    fn from(err: ExecutorError) -> Self {
        Self {
            kind: if err.is_timeout() {
                ErrorKind::Timeout
            } else {
                ErrorKind::ExecutionError
            },
            code: err.code().code().to_string(),
            message: err.message().to_string(),
            details: None,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
