//! Translation settings
//!
//! ```json
//! {
//!   "default_limit": 50,
//!   "default_offset": 0,
//!   "max_page_size": 100,
//!   "default_attribute": "id",
//!   "log_level": "info"
//! }
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

/// Page size applied when the client sends none
pub const DEFAULT_LIMIT: u64 = 50;

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}
fn default_attribute() -> String {
    "id".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Settings shared by every translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Limit (or page size) when absent from the request
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Offset when absent from the request
    #[serde(default)]
    pub default_offset: u64,

    /// Upper bound on `page[limit]` and `page[size]`
    #[serde(default)]
    pub max_page_size: Option<u64>,

    /// Attribute compared against when a filter or sort ends on a relationship
    #[serde(default = "default_attribute")]
    pub default_attribute: String,

    /// Minimum log severity
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_offset: 0,
            max_page_size: None,
            default_attribute: default_attribute(),
            log_level: default_log_level(),
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_limit == 0 {
            return Err("default_limit must be > 0".into());
        }

        if let Some(max) = self.max_page_size {
            if max == 0 {
                return Err("max_page_size must be > 0".into());
            }
            if self.default_limit > max {
                return Err(format!(
                    "default_limit {} exceeds max_page_size {}",
                    self.default_limit, max
                ));
            }
        }

        if self.default_attribute.trim().is_empty() {
            return Err("default_attribute must not be empty".into());
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> Result<Severity, String> {
        Severity::parse(&self.log_level)
            .ok_or_else(|| format!("Invalid log_level: '{}'", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config: QueryConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, QueryConfig::default());
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.default_offset, 0);
        assert_eq!(config.default_attribute, "id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_limit_above_max_rejected() {
        let config = QueryConfig {
            max_page_size: Some(10),
            ..QueryConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("max_page_size"));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let config = QueryConfig {
            log_level: "loud".into(),
            ..QueryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
