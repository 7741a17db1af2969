//! Registry loading errors

use thiserror::Error;

/// Failures while reading or cross-checking a registry file
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },

    /// A model or schema names something that does not exist or does not fit
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LoaderError {
    pub fn code(&self) -> &'static str {
        match self {
            LoaderError::Io { .. } => "LOADER_IO",
            LoaderError::Parse { .. } => "LOADER_PARSE",
            LoaderError::Duplicate { .. } => "LOADER_DUPLICATE",
            LoaderError::InvalidReference(_) => "LOADER_INVALID_REFERENCE",
            LoaderError::InvalidConfig(_) => "LOADER_INVALID_CONFIG",
        }
    }
}

pub type LoaderResult<T> = Result<T, LoaderError>;
