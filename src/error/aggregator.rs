//! Error aggregation and JSON:API error documents
//!
//! Every instruction is resolved independently; user-facing failures are
//! collected here instead of short-circuiting, so a client can fix every
//! parameter in one round trip.

use serde::Serialize;

use super::{QueryError, QueryResult};

/// Collects per-parameter errors for one request
#[derive(Debug, Clone, Default)]
pub struct ErrorAggregator {
    errors: Vec<QueryError>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user-facing error
    pub fn push(&mut self, error: QueryError) {
        self.errors.push(error);
    }

    /// Unwrap a stage result, recording parameter errors.
    ///
    /// Returns `Ok(None)` when the error was recorded and `Err` when it is
    /// fatal and must abort the request.
    pub fn recover<T>(&mut self, result: QueryResult<T>) -> QueryResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.errors.push(err);
                Ok(None)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[QueryError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<QueryError> {
        self.errors
    }
}

/// `source` member of a JSON:API error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSource {
    pub parameter: String,
}

/// A JSON:API error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub status: String,
    pub code: String,
    pub title: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

impl From<&QueryError> for ErrorObject {
    fn from(err: &QueryError) -> Self {
        Self {
            status: err.code().http_status().to_string(),
            code: err.code().code().to_string(),
            title: err.code().name(),
            detail: err.detail().to_string(),
            source: err.source().map(|parameter| ErrorSource {
                parameter: parameter.to_string(),
            }),
        }
    }
}

/// Top-level `{"errors": [...]}` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    /// Highest status among the errors (400 unless a fatal error is present)
    pub fn status(&self) -> u16 {
        self.errors
            .iter()
            .filter_map(|e| e.status.parse::<u16>().ok())
            .max()
            .unwrap_or(400)
    }
}

impl From<&[QueryError]> for ErrorDocument {
    fn from(errors: &[QueryError]) -> Self {
        Self {
            errors: errors.iter().map(ErrorObject::from).collect(),
        }
    }
}

impl From<QueryError> for ErrorDocument {
    fn from(error: QueryError) -> Self {
        Self {
            errors: vec![ErrorObject::from(&error)],
        }
    }
}
