//! # Model Path Resolver
//!
//! Re-walks a schema-resolved path against the model layer using model-level
//! names. Each relationship hop becomes a join descriptor; the terminal
//! attribute becomes a column on the last joined model.
//!
//! Anything the view layer exposes but the model layer lacks is a
//! configuration fault and fails with `ModelMismatch`.

use std::fmt;

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::schema::{SchemaPath, ViewLayer};

use super::registry::ModelLayer;

/// Identity of a join: the relationship taken from a source model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JoinKey {
    pub source: String,
    pub relationship: String,
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source, self.relationship)
    }
}

/// `source.local_column = target.remote_column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinCondition {
    pub local_column: String,
    pub remote_column: String,
}

/// One relationship hop at the model level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinDescriptor {
    pub key: JoinKey,
    pub source: String,
    pub target: String,
    pub condition: JoinCondition,
    /// Source and target are the same model
    pub self_referential: bool,
    /// More than one relationship leads from source to target
    pub ambiguous: bool,
}

impl JoinDescriptor {
    /// Whether the target must be joined under a generated alias
    pub fn needs_alias(&self) -> bool {
        self.self_referential || self.ambiguous
    }
}

/// A path resolved against the model layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPath {
    pub root: String,
    pub joins: Vec<JoinDescriptor>,
    /// Model the terminal segment lives on
    pub target: String,
    /// Terminal column; absent for relationship-only paths
    pub column: Option<String>,
}

/// Resolves schema paths against a model layer
pub struct ModelResolver<'a, M: ModelLayer + ?Sized, V: ViewLayer + ?Sized> {
    models: &'a M,
    view: &'a V,
}

impl<'a, M: ModelLayer + ?Sized, V: ViewLayer + ?Sized> ModelResolver<'a, M, V> {
    pub fn new(models: &'a M, view: &'a V) -> Self {
        Self { models, view }
    }

    /// Model bound to a schema
    pub fn model_for_schema(&self, schema: &str) -> QueryResult<&'a str> {
        let def = self
            .view
            .schema(schema)
            .ok_or_else(|| QueryError::unknown_schema(schema))?;
        if self.models.model(&def.model).is_none() {
            return Err(QueryError::model_mismatch(format!(
                "Schema '{}' is bound to unknown model '{}'.",
                schema, def.model
            )));
        }
        Ok(def.model.as_str())
    }

    pub fn resolve(&self, path: &SchemaPath) -> QueryResult<ModelPath> {
        let root = self.model_for_schema(&path.root)?;
        let mut current = root.to_string();
        let mut joins = Vec::with_capacity(path.relationships.len());

        for segment in &path.relationships {
            let relation = self
                .models
                .relationship(&current, &segment.model_name)
                .ok_or_else(|| {
                    QueryError::model_mismatch(format!(
                        "Model '{}' has no relationship '{}' (field '{}' of path '{}').",
                        current,
                        segment.model_name,
                        segment.field_name,
                        path.path_string()
                    ))
                })?;

            let expected = self.model_for_schema(&segment.schema)?;
            if relation.target != expected {
                return Err(QueryError::model_mismatch(format!(
                    "Relationship '{}.{}' targets model '{}' but schema '{}' is bound to '{}'.",
                    current, segment.model_name, relation.target, segment.schema, expected
                )));
            }

            for (model, column) in [
                (current.as_str(), &relation.local_column),
                (relation.target.as_str(), &relation.remote_column),
            ] {
                if self.models.column(model, column).is_none() {
                    return Err(QueryError::model_mismatch(format!(
                        "Join column '{}.{}' does not exist.",
                        model, column
                    )));
                }
            }

            let ambiguous = self
                .models
                .relationships_between(&current, &relation.target)
                .len()
                > 1;

            joins.push(JoinDescriptor {
                key: JoinKey {
                    source: current.clone(),
                    relationship: segment.model_name.clone(),
                },
                source: current.clone(),
                target: relation.target.clone(),
                condition: JoinCondition {
                    local_column: relation.local_column.clone(),
                    remote_column: relation.remote_column.clone(),
                },
                self_referential: current == relation.target,
                ambiguous,
            });
            current = relation.target.clone();
        }

        let column = match &path.attribute {
            Some(attribute) => {
                if self.models.column(&current, &attribute.attribute).is_none() {
                    return Err(QueryError::model_mismatch(format!(
                        "Model '{}' has no column '{}' (field '{}').",
                        current, attribute.attribute, attribute.field
                    )));
                }
                Some(attribute.attribute.clone())
            }
            None => None,
        };

        Ok(ModelPath {
            root: root.to_string(),
            joins,
            target: current,
            column,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorCode;
    use crate::model::registry::ModelRegistry;
    use crate::model::types::{ModelDef, RelationDef};
    use crate::schema::{FieldDef, FieldType, SchemaDef, SchemaRegistry, SchemaResolver};
    use crate::url::parse_parameters;
    use crate::value::ValueType;

    fn layers() -> (ModelRegistry, SchemaRegistry) {
        let mut models = ModelRegistry::new();
        models.insert(
            ModelDef::new("category")
                .column("id", ValueType::Integer)
                .column("name", ValueType::String)
                .column("category_id", ValueType::Integer)
                .relationship("category", RelationDef::new("category", "category_id", "id")),
        );
        models.insert(
            ModelDef::new("product")
                .column("id", ValueType::Integer)
                .column("primary_category_id", ValueType::Integer)
                .column("secondary_category_id", ValueType::Integer)
                .relationship(
                    "primary_category",
                    RelationDef::new("category", "primary_category_id", "id"),
                )
                .relationship(
                    "secondary_category",
                    RelationDef::new("category", "secondary_category_id", "id"),
                ),
        );

        let mut schemas = SchemaRegistry::new();
        schemas.insert(
            SchemaDef::new("category", "categories", "category")
                .field("id", FieldDef::key(FieldType::Integer))
                .field("name", FieldDef::new(FieldType::String))
                .field("parent", FieldDef::relationship("category").with_attribute("category"))
                .field("label", FieldDef::new(FieldType::String).with_attribute("title")),
        );
        schemas.insert(
            SchemaDef::new("product", "products", "product")
                .field("id", FieldDef::key(FieldType::Integer))
                .field("primary_category", FieldDef::relationship("category"))
                .field("secondary_category", FieldDef::relationship("category")),
        );
        (models, schemas)
    }

    fn resolve(models: &ModelRegistry, schemas: &SchemaRegistry, root: &str, key: &str) -> QueryResult<ModelPath> {
        let filter = parse_parameters([(key, "x")]).filters.remove(0);
        let path = SchemaResolver::new(schemas, "id").resolve_attribute(root, &filter)?;
        ModelResolver::new(models, schemas).resolve(&path)
    }

    #[test]
    fn test_ambiguous_relationship_flagged() {
        let (models, schemas) = layers();
        let path = resolve(&models, &schemas, "product", "filter[primary_category.name]").unwrap();
        assert_eq!(path.joins.len(), 1);
        let join = &path.joins[0];
        assert!(join.ambiguous);
        assert!(!join.self_referential);
        assert_eq!(join.key.relationship, "primary_category");
        assert_eq!(join.condition.local_column, "primary_category_id");
        assert_eq!(path.column.as_deref(), Some("name"));
    }

    #[test]
    fn test_self_referential_flagged() {
        let (models, schemas) = layers();
        let path = resolve(&models, &schemas, "category", "filter[parent.parent.name]").unwrap();
        assert_eq!(path.joins.len(), 2);
        assert!(path.joins.iter().all(|j| j.self_referential && j.needs_alias()));
        assert_eq!(path.target, "category");
    }

    #[test]
    fn test_missing_column_is_model_mismatch() {
        let (models, schemas) = layers();
        let err = resolve(&models, &schemas, "category", "filter[label]").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::ModelMismatch);
        assert!(err.is_fatal());
    }
}
