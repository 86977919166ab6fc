//! Parameter validation errors
//!
//! Error codes:
//! - SQ_MISSING_PARAMETER (REJECT)
//! - SQ_TYPE_MISMATCH (REJECT)
//! - SQ_OUT_OF_RANGE (REJECT)
//! - SQ_UNKNOWN_PARAMETER (REJECT)
//!
//! Every validation error is raised before the store is touched.

use std::fmt;

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// Required parameter absent
    MissingParameter,
    /// Value does not match the declared type union
    TypeMismatch,
    /// Value violates a maximum, minimum or enum constraint
    OutOfRange,
    /// Parameter not declared and additional properties are disallowed
    UnknownParameter,
}

impl ValidationErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorCode::MissingParameter => "SQ_MISSING_PARAMETER",
            ValidationErrorCode::TypeMismatch => "SQ_TYPE_MISMATCH",
            ValidationErrorCode::OutOfRange => "SQ_OUT_OF_RANGE",
            ValidationErrorCode::UnknownParameter => "SQ_UNKNOWN_PARAMETER",
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Parameter path (e.g., "select[1]")
    pub param: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        param: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            param: param.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter '{}': expected {}, got {}",
            self.param, self.expected, self.actual
        )
    }
}

/// Parameter validation error with full context
#[derive(Debug, Clone)]
pub struct ValidationError {
    code: ValidationErrorCode,
    message: String,
    details: ValidationDetails,
}

impl ValidationError {
    /// Create a missing parameter error
    pub fn missing_parameter(param: impl Into<String>) -> Self {
        let details = ValidationDetails::new(param, "parameter to be present", "missing");
        Self {
            code: ValidationErrorCode::MissingParameter,
            message: format!("Missing required parameter '{}'", details.param),
            details,
        }
    }

    /// Create an unknown parameter error
    pub fn unknown_parameter(param: impl Into<String>) -> Self {
        let details =
            ValidationDetails::new(param, "no undeclared parameters", "undeclared parameter");
        Self {
            code: ValidationErrorCode::UnknownParameter,
            message: format!("Unknown parameter '{}'", details.param),
            details,
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        param: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let details = ValidationDetails::new(param, expected, actual);
        Self {
            code: ValidationErrorCode::TypeMismatch,
            message: format!("Type mismatch: {}", details),
            details,
        }
    }

    /// Create an out of range error
    pub fn out_of_range(
        param: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let details = ValidationDetails::new(param, expected, actual);
        Self {
            code: ValidationErrorCode::OutOfRange,
            message: format!("Value out of range: {}", details),
            details,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ValidationErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending parameter, expected and actual values
    pub fn details(&self) -> &ValidationDetails {
        &self.details
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation and binding
pub type SchemaResult<T> = Result<T, ValidationError>;
