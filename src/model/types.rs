//! Relational model definitions
//!
//! ```json
//! {
//!   "name": "student",
//!   "primary_key": "id",
//!   "columns": {"id": {"type": "integer"}, "school_id": {"type": "integer"}},
//!   "relationships": {
//!     "school": {"target": "school", "local_column": "school_id", "remote_column": "id"}
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::ValueType;

fn default_primary_key() -> String {
    "id".to_string()
}

/// Join between two models: `source.local_column = target.remote_column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    pub target: String,
    pub local_column: String,
    pub remote_column: String,
}

impl RelationDef {
    pub fn new(
        target: impl Into<String>,
        local_column: impl Into<String>,
        remote_column: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            local_column: local_column.into(),
            remote_column: remote_column.into(),
        }
    }
}

/// A table-like model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    pub columns: BTreeMap<String, ValueType>,
    #[serde(default)]
    pub relationships: BTreeMap<String, RelationDef>,
    /// Column naming the runtime type of polymorphic rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: default_primary_key(),
            columns: BTreeMap::new(),
            relationships: BTreeMap::new(),
            discriminator: None,
        }
    }

    pub fn column(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.columns.insert(name.into(), value_type);
        self
    }

    pub fn relationship(mut self, name: impl Into<String>, relation: RelationDef) -> Self {
        self.relationships.insert(name.into(), relation);
        self
    }

    pub fn with_discriminator(mut self, column: impl Into<String>) -> Self {
        self.discriminator = Some(column.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_json_defaults() {
        let model: ModelDef = serde_json::from_value(json!({
            "name": "school",
            "columns": {"id": {"type": "integer"}, "name": {"type": "string"}}
        }))
        .unwrap();
        assert_eq!(model.primary_key, "id");
        assert!(model.relationships.is_empty());
        assert_eq!(model.columns.get("name"), Some(&ValueType::String));
        assert!(model.discriminator.is_none());
    }
}
