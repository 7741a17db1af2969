//! Executor error types
//!
//! Error codes:
//! - EXEC_UNKNOWN_MODEL (ERROR)
//! - EXEC_INVALID_PLAN (ERROR)
//! - EXEC_INVALID_ROW (FATAL)

use std::fmt;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query failed but the data layer is healthy
    Error,
    /// Loaded data is unusable
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Query or data names a model the data layer does not hold
    UnknownModel,
    /// Builder received a join or include that does not fit the query
    InvalidPlan,
    /// A dataset row does not match its model
    InvalidRow,
}

impl ExecutorErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::UnknownModel => "EXEC_UNKNOWN_MODEL",
            ExecutorErrorCode::InvalidPlan => "EXEC_INVALID_PLAN",
            ExecutorErrorCode::InvalidRow => "EXEC_INVALID_ROW",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::InvalidRow => Severity::Fatal,
            _ => Severity::Error,
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
    code: ExecutorErrorCode,
    message: String,
    /// Model the error concerns, if any
    model: Option<String>,
}

impl ExecutorError {
    pub fn unknown_model(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: ExecutorErrorCode::UnknownModel,
            message: format!("Unknown model '{}'", model),
            model: Some(model),
        }
    }

    pub fn invalid_plan(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::InvalidPlan,
            message: reason.into(),
            model: None,
        }
    }

    /// Create an invalid row error (FATAL)
    pub fn invalid_row(model: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: ExecutorErrorCode::InvalidRow,
            message: format!("Row {} of '{}': {}", index, model, reason.into()),
            model: Some(model),
        }
    }

    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExecutorErrorCode::UnknownModel.code(), "EXEC_UNKNOWN_MODEL");
        assert_eq!(ExecutorErrorCode::InvalidPlan.code(), "EXEC_INVALID_PLAN");
        assert_eq!(ExecutorErrorCode::InvalidRow.code(), "EXEC_INVALID_ROW");
    }

    #[test]
    fn test_invalid_row_is_fatal() {
        let err = ExecutorError::invalid_row("person", 3, "expected integer");
        assert!(err.is_fatal());
        assert_eq!(err.model(), Some("person"));
    }

    #[test]
    fn test_error_display() {
        let err = ExecutorError::unknown_model("ghost");
        let display = format!("{}", err);
        assert!(display.contains("EXEC_UNKNOWN_MODEL"));
        assert!(display.contains("ERROR"));
        assert!(display.contains("ghost"));
    }
}
