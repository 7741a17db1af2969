//! Typed values shared by the schema and model layers
//!
//! Supported value types:
//! - string: UTF-8 string
//! - integer: 64-bit signed integer
//! - float: 64-bit floating point
//! - boolean: Boolean
//! - date: calendar date (`YYYY-MM-DD`)
//! - datetime: RFC 3339 timestamp, normalized to UTC
//! - uuid: hyphenated UUID
//! - enum: string restricted to a declared member set

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Value coercion failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Raw text could not be parsed as the expected type
    #[error("Invalid {expected} value: '{raw}'")]
    Invalid { expected: &'static str, raw: String },

    /// Raw text is not a member of the enum constraint
    #[error("Value '{raw}' is not one of: {allowed}")]
    NotAllowed { raw: String, allowed: String },

    /// Stored cell does not match the declared column type
    #[error("Stored value {found} does not match type {expected}")]
    TypeMismatch { expected: &'static str, found: String },
}

/// Declared type of an attribute or column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
    Uuid,
    /// String restricted to a member set
    Enum { values: Vec<String> },
}

impl ValueType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Datetime => "datetime",
            ValueType::Uuid => "uuid",
            ValueType::Enum { .. } => "enum",
        }
    }

    /// Free text (substring matching allowed)
    pub fn is_text(&self) -> bool {
        matches!(self, ValueType::String)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, ValueType::Enum { .. })
    }

    /// Returns the enum member set, if constrained
    pub fn enum_values(&self) -> Option<&[String]> {
        match self {
            ValueType::Enum { values } => Some(values),
            _ => None,
        }
    }

    /// Parses raw request text into a typed value.
    ///
    /// The empty string always parses to `Value::Null`.
    pub fn parse(&self, raw: &str) -> Result<Value, ValueError> {
        if raw.is_empty() {
            return Ok(Value::Null);
        }

        let invalid = || ValueError::Invalid {
            expected: self.type_name(),
            raw: raw.to_string(),
        };

        match self {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Integer => raw.parse().map(Value::Integer).map_err(|_| invalid()),
            ValueType::Float => match raw.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(invalid()),
            },
            ValueType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" | "on" => Ok(Value::Boolean(true)),
                "false" | "f" | "0" | "no" | "off" => Ok(Value::Boolean(false)),
                _ => Err(invalid()),
            },
            ValueType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid()),
            ValueType::Datetime => parse_datetime(raw).map(Value::DateTime).ok_or_else(invalid),
            ValueType::Uuid => Uuid::parse_str(raw).map(Value::Uuid).map_err(|_| invalid()),
            ValueType::Enum { values } => {
                if values.iter().any(|v| v == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(ValueError::NotAllowed {
                        raw: raw.to_string(),
                        allowed: values.join(", "),
                    })
                }
            }
        }
    }

    /// Decodes a stored JSON cell into a typed value.
    pub fn decode(&self, cell: &serde_json::Value) -> Result<Value, ValueError> {
        use serde_json::Value as Json;

        let mismatch = || ValueError::TypeMismatch {
            expected: self.type_name(),
            found: cell.to_string(),
        };

        match (self, cell) {
            (_, Json::Null) => Ok(Value::Null),
            (ValueType::Integer, Json::Number(n)) => n.as_i64().map(Value::Integer).ok_or_else(mismatch),
            (ValueType::Float, Json::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(mismatch),
            (ValueType::Boolean, Json::Bool(b)) => Ok(Value::Boolean(*b)),
            (ValueType::String, Json::String(s)) => Ok(Value::String(s.clone())),
            (
                ValueType::Date | ValueType::Datetime | ValueType::Uuid | ValueType::Enum { .. },
                Json::String(s),
            ) => self.parse(s).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// One stored row, keyed by model column name
pub type Row = BTreeMap<String, Value>;

/// A typed value produced by deserialization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string payload for text values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values of compatible types.
    ///
    /// Integers and floats compare numerically. Returns `None` for
    /// incompatible types and for nulls.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality used by filters: null only equals null.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Total ordering for sorting: nulls first, incomparable values equal.
    pub fn sort_order(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            _ => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Converts to a JSON value for documents and plans
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}
