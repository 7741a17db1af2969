//! Schema (view layer) type definitions
//!
//! A schema exposes a model under a JSON:API resource type. Fields are either
//! typed attributes or relationships to another schema:
//!
//! ```json
//! {
//!   "name": "person",
//!   "type": "people",
//!   "model": "person",
//!   "fields": {
//!     "id": {"type": "integer", "key": true},
//!     "name": {"type": "string"},
//!     "student": {"type": "relationship", "schema": "student"}
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::url::Strategy;
use crate::value::ValueType;

/// Field kinds exposed by a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
    Uuid,
    Enum {
        values: Vec<String>,
    },
    /// Link to another schema by name
    Relationship {
        schema: String,
    },
}

impl FieldType {
    /// Returns the value type of an attribute field, `None` for relationships
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            FieldType::String => Some(ValueType::String),
            FieldType::Integer => Some(ValueType::Integer),
            FieldType::Float => Some(ValueType::Float),
            FieldType::Boolean => Some(ValueType::Boolean),
            FieldType::Date => Some(ValueType::Date),
            FieldType::Datetime => Some(ValueType::Datetime),
            FieldType::Uuid => Some(ValueType::Uuid),
            FieldType::Enum { values } => Some(ValueType::Enum {
                values: values.clone(),
            }),
            FieldType::Relationship { .. } => None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, FieldType::Relationship { .. })
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Model-level name when it differs from the field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Primary or foreign key
    #[serde(default)]
    pub key: bool,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            attribute: None,
            key: false,
        }
    }

    /// Create a key attribute
    pub fn key(field_type: FieldType) -> Self {
        Self {
            key: true,
            ..Self::new(field_type)
        }
    }

    /// Create a relationship field
    pub fn relationship(schema: impl Into<String>) -> Self {
        Self::new(FieldType::Relationship {
            schema: schema.into(),
        })
    }

    /// Bind the field to a differently named model attribute
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Model-level name for a field called `name`
    pub fn model_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.attribute.as_deref().unwrap_or(name)
    }
}

/// Complete schema definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Registry name, referenced by relationship fields
    pub name: String,
    /// JSON:API resource type
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Bound model name
    pub model: String,
    pub fields: BTreeMap<String, FieldDef>,
}

impl SchemaDef {
    pub fn new(
        name: impl Into<String>,
        resource_type: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            model: model.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }
}

/// Resolved attribute field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDescriptor {
    /// Schema field name
    pub field: String,
    /// Model attribute name
    pub attribute: String,
    pub value_type: ValueType,
    pub key: bool,
    pub default_strategy: Strategy,
    pub allowed: Vec<Strategy>,
}

impl AttributeDescriptor {
    pub fn new(field: &str, def: &FieldDef, value_type: ValueType) -> Self {
        let default_strategy = if def.key || value_type.is_enum() {
            Strategy::Eq
        } else if value_type.is_text() {
            Strategy::Ilike
        } else {
            Strategy::Eq
        };

        let allowed = Strategy::ALL
            .into_iter()
            .filter(|s| strategy_allowed(&value_type, *s))
            .collect();

        Self {
            field: field.to_string(),
            attribute: def.model_name(field).to_string(),
            value_type,
            key: def.key,
            default_strategy,
            allowed,
        }
    }

    pub fn allows(&self, strategy: Strategy) -> bool {
        self.allowed.contains(&strategy)
    }
}

/// Enums only compare for equality; substring matching needs text.
fn strategy_allowed(value_type: &ValueType, strategy: Strategy) -> bool {
    if value_type.is_enum() {
        return strategy == Strategy::Eq;
    }
    value_type.is_text() || !strategy.is_substring()
}

/// Resolved relationship field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipDescriptor {
    /// Schema field name
    pub field: String,
    /// Model relationship name
    pub attribute: String,
    /// Related schema name
    pub schema: String,
}

/// Outcome of a field lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedField {
    Attribute(AttributeDescriptor),
    Relationship(RelationshipDescriptor),
}

/// JSON:API resource object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}
