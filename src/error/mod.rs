//! Query translation errors
//!
//! Error codes live in the 120000 namespace:
//! - 120001 InvalidPath (REJECT)
//! - 120002 InvalidFieldType (REJECT)
//! - 120003 InvalidValue (REJECT)
//! - 120004 InvalidStrategy (REJECT)
//! - 120005 InvalidPaginationValue (REJECT)
//! - 120006 ConflictingPagination (REJECT)
//! - 120007 AmbiguousJoin (FATAL)
//! - 120008 ModelMismatch (FATAL)
//! - 120009 UnknownSchema (FATAL)
//!
//! REJECT errors belong to one request parameter and are collected by the
//! [`ErrorAggregator`]. FATAL errors are configuration faults between the
//! schema and model layers and abort the whole request.

mod aggregator;

pub use aggregator::{ErrorAggregator, ErrorDocument, ErrorObject, ErrorSource};

use std::fmt;

/// Base of the error code namespace
pub const ERROR_NAMESPACE: u32 = 120000;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Configuration fault; the request cannot be served
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorCode {
    /// Unknown field or path segment
    InvalidPath,
    /// Relationship used where an attribute is required, or vice versa
    InvalidFieldType,
    /// Value could not be coerced to the attribute type
    InvalidValue,
    /// Strategy not allowed for the attribute type
    InvalidStrategy,
    /// Non-numeric or out-of-range paginator
    InvalidPaginationValue,
    /// Offset and page-number pagination mixed in one request
    ConflictingPagination,
    /// Join chain could not be routed to a single alias
    AmbiguousJoin,
    /// Schema layer names something the model layer does not define
    ModelMismatch,
    /// Root schema is not registered
    UnknownSchema,
}

impl QueryErrorCode {
    /// Offset within the error namespace
    fn offset(&self) -> u32 {
        match self {
            QueryErrorCode::InvalidPath => 1,
            QueryErrorCode::InvalidFieldType => 2,
            QueryErrorCode::InvalidValue => 3,
            QueryErrorCode::InvalidStrategy => 4,
            QueryErrorCode::InvalidPaginationValue => 5,
            QueryErrorCode::ConflictingPagination => 6,
            QueryErrorCode::AmbiguousJoin => 7,
            QueryErrorCode::ModelMismatch => 8,
            QueryErrorCode::UnknownSchema => 9,
        }
    }

    /// Returns the numeric code
    pub fn code(&self) -> u32 {
        ERROR_NAMESPACE + self.offset()
    }

    /// Returns the error kind name
    pub fn name(&self) -> &'static str {
        match self {
            QueryErrorCode::InvalidPath => "InvalidPath",
            QueryErrorCode::InvalidFieldType => "InvalidFieldType",
            QueryErrorCode::InvalidValue => "InvalidValue",
            QueryErrorCode::InvalidStrategy => "InvalidStrategy",
            QueryErrorCode::InvalidPaginationValue => "InvalidPaginationValue",
            QueryErrorCode::ConflictingPagination => "ConflictingPagination",
            QueryErrorCode::AmbiguousJoin => "AmbiguousJoin",
            QueryErrorCode::ModelMismatch => "ModelMismatch",
            QueryErrorCode::UnknownSchema => "UnknownSchema",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            QueryErrorCode::AmbiguousJoin
            | QueryErrorCode::ModelMismatch
            | QueryErrorCode::UnknownSchema => Severity::Fatal,
            _ => Severity::Reject,
        }
    }

    /// HTTP status reported for this error
    pub fn http_status(&self) -> u16 {
        match self.severity() {
            Severity::Reject => 400,
            Severity::Fatal => 500,
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Query error with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// Error code
    code: QueryErrorCode,
    /// Human-readable detail
    detail: String,
    /// Request parameter the error belongs to
    source: Option<String>,
}

impl QueryError {
    fn new(code: QueryErrorCode, detail: impl Into<String>, source: Option<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            source,
        }
    }

    /// Create an invalid path error; the detail names the full path
    pub fn invalid_path(source: impl Into<String>, path: &str, segment: &str) -> Self {
        Self::new(
            QueryErrorCode::InvalidPath,
            format!("Invalid field '{}' in path '{}'.", segment, path),
            Some(source.into()),
        )
    }

    /// Create an invalid field type error
    pub fn invalid_field_type(source: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::InvalidFieldType, detail, Some(source.into()))
    }

    /// Create an invalid value error
    pub fn invalid_value(source: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::InvalidValue, detail, Some(source.into()))
    }

    /// Create an invalid strategy error
    pub fn invalid_strategy(
        source: impl Into<String>,
        strategy: impl fmt::Display,
        field: &str,
        type_name: &str,
    ) -> Self {
        Self::new(
            QueryErrorCode::InvalidStrategy,
            format!(
                "Strategy '{}' is not allowed for {} field '{}'.",
                strategy, type_name, field
            ),
            Some(source.into()),
        )
    }

    /// Create an invalid pagination value error
    pub fn invalid_pagination_value(source: impl Into<String>, value: &str) -> Self {
        Self::new(
            QueryErrorCode::InvalidPaginationValue,
            format!("Invalid value \"{}\" specified.", value),
            Some(source.into()),
        )
    }

    /// Create a page size exceeded error
    pub fn page_size_exceeded(source: impl Into<String>, value: u64, max: u64) -> Self {
        Self::new(
            QueryErrorCode::InvalidPaginationValue,
            format!("Page size {} exceeds the maximum of {}.", value, max),
            Some(source.into()),
        )
    }

    /// Create a conflicting pagination error
    pub fn conflicting_pagination(source: impl Into<String>) -> Self {
        Self::new(
            QueryErrorCode::ConflictingPagination,
            "Offset pagination (page[limit], page[offset]) cannot be combined with \
             page-number pagination (page[size], page[number]).",
            Some(source.into()),
        )
    }

    /// Create an ambiguous join error (FATAL)
    pub fn ambiguous_join(detail: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::AmbiguousJoin, detail, None)
    }

    /// Create a model mismatch error (FATAL)
    pub fn model_mismatch(detail: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::ModelMismatch, detail, None)
    }

    /// Create an unknown schema error (FATAL)
    pub fn unknown_schema(name: &str) -> Self {
        Self::new(
            QueryErrorCode::UnknownSchema,
            format!("Schema '{}' is not registered.", name),
            None,
        )
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the detail message
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the source parameter if applicable
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns whether this error aborts the request
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.code.severity(),
            self.code.name(),
            self.code.code(),
            self.detail
        )?;
        if let Some(ref source) = self.source {
            write!(f, " [parameter {}]", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

/// Result type for query translation
pub type QueryResult<T> = Result<T, QueryError>;
