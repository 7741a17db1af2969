//! CLI-specific error types

use std::fmt;
use std::io;

use crate::executor::ExecutorError;
use crate::loader::LoaderError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, files)
    IoError,
    /// Registry or dataset failed to load
    RegistryError,
    /// One or more query parameters were rejected
    QueryRejected,
    /// Schema and model layers disagree
    ConfigurationFault,
    /// The data layer failed
    ExecutionFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLI_CONFIG_ERROR",
            Self::IoError => "CLI_IO_ERROR",
            Self::RegistryError => "CLI_REGISTRY_ERROR",
            Self::QueryRejected => "CLI_QUERY_REJECTED",
            Self::ConfigurationFault => "CLI_CONFIGURATION_FAULT",
            Self::ExecutionFailed => "CLI_EXECUTION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn registry_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RegistryError, msg)
    }

    /// `count` parameters were rejected
    pub fn query_rejected(count: usize) -> Self {
        Self::new(
            CliErrorCode::QueryRejected,
            format!("{} query parameter(s) rejected", count),
        )
    }

    pub fn configuration_fault(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigurationFault, msg)
    }

    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ExecutionFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<LoaderError> for CliError {
    fn from(e: LoaderError) -> Self {
        Self::registry_error(format!("[{}] {}", e.code(), e))
    }
}

impl From<ExecutorError> for CliError {
    fn from(e: ExecutorError) -> Self {
        if e.is_fatal() {
            Self::registry_error(e.to_string())
        } else {
            Self::execution_failed(e.to_string())
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
