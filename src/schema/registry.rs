//! Schema registry and the view-layer interface consumed by the resolvers

use std::collections::BTreeMap;

use crate::value::{Row, Value, ValueError};

use super::types::{
    AttributeDescriptor, FieldType, RelationshipDescriptor, ResolvedField, ResourceObject,
    SchemaDef,
};

/// Schema/view layer operations needed to translate and render a request
pub trait ViewLayer {
    /// Look up a schema by registry name
    fn schema(&self, name: &str) -> Option<&SchemaDef>;

    /// Look up the schema exposing a JSON:API resource type
    fn schema_for_type(&self, resource_type: &str) -> Option<&SchemaDef>;

    /// Look up the first schema bound to a model
    fn schema_for_model(&self, model: &str) -> Option<&SchemaDef>;

    /// Resolve a (normalized) field name on a schema
    fn resolve_field(&self, schema: &str, name: &str) -> Option<ResolvedField>;

    /// Coerce raw request text through an attribute descriptor
    fn deserialize(&self, attribute: &AttributeDescriptor, raw: &str) -> Result<Value, ValueError> {
        attribute.value_type.parse(raw)
    }

    /// Render a row as a resource object, keeping only `fields` when given
    fn serialize(
        &self,
        schema: &str,
        id: &Value,
        row: &Row,
        fields: Option<&[String]>,
    ) -> Option<ResourceObject>;
}

/// Immutable set of schemas, built at startup
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaDef>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, returning the one it replaced
    pub fn insert(&mut self, schema: SchemaDef) -> Option<SchemaDef> {
        self.schemas.insert(schema.name.clone(), schema)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &SchemaDef> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl ViewLayer for SchemaRegistry {
    fn schema(&self, name: &str) -> Option<&SchemaDef> {
        self.schemas.get(name)
    }

    fn schema_for_type(&self, resource_type: &str) -> Option<&SchemaDef> {
        self.schemas
            .values()
            .find(|s| s.resource_type == resource_type)
    }

    fn schema_for_model(&self, model: &str) -> Option<&SchemaDef> {
        self.schemas.values().find(|s| s.model == model)
    }

    fn resolve_field(&self, schema: &str, name: &str) -> Option<ResolvedField> {
        let def = self.schemas.get(schema)?.fields.get(name)?;

        let resolved = match &def.field_type {
            FieldType::Relationship { schema } => ResolvedField::Relationship(RelationshipDescriptor {
                field: name.to_string(),
                attribute: def.model_name(name).to_string(),
                schema: schema.clone(),
            }),
            other => {
                let value_type = other.value_type()?;
                ResolvedField::Attribute(AttributeDescriptor::new(name, def, value_type))
            }
        };

        Some(resolved)
    }

    fn serialize(
        &self,
        schema: &str,
        id: &Value,
        row: &Row,
        fields: Option<&[String]>,
    ) -> Option<ResourceObject> {
        let def = self.schemas.get(schema)?;

        let attributes = def
            .fields
            .iter()
            .filter(|(name, field)| !field.field_type.is_relationship() && name.as_str() != "id")
            .filter(|(name, _)| fields.map_or(true, |f| f.iter().any(|x| x == *name)))
            .map(|(name, field)| {
                let value = row
                    .get(field.model_name(name))
                    .map(Value::to_json)
                    .unwrap_or(serde_json::Value::Null);
                (name.clone(), value)
            })
            .collect();

        Some(ResourceObject {
            resource_type: def.resource_type.clone(),
            id: id.to_string(),
            attributes,
        })
    }
}
