//! # Schema Path Resolver
//!
//! Walks a dotted instruction path against the view layer. Every non-terminal
//! segment must be a relationship; the terminal segment must be an attribute
//! for filters and sorts, and a relationship for includes.
//!
//! Request names are normalized (`birth-date` becomes `birth_date`) before
//! lookup. A filter or sort ending on a relationship falls back to the related
//! schema's default identifier attribute.

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::url::{Filter, FilterStrategy, Instruction};
use crate::value::Value;

use super::registry::ViewLayer;
use super::types::{AttributeDescriptor, ResolvedField};

/// Replace dasherized separators with the registry's underscores
pub fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

/// One relationship hop, as seen by the view layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipSegment {
    /// Name as written in the request
    pub request_name: String,
    /// Normalized schema field name
    pub field_name: String,
    /// Model-level relationship name
    pub model_name: String,
    /// Related schema
    pub schema: String,
    pub is_terminal: bool,
}

/// A path resolved against the view layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaPath {
    pub source: String,
    /// Segments as requested
    pub path: Vec<String>,
    /// Root schema name
    pub root: String,
    pub relationships: Vec<RelationshipSegment>,
    /// Terminal attribute; absent for relationship-only paths
    pub attribute: Option<AttributeDescriptor>,
}

impl SchemaPath {
    /// Schema the terminal segment lives on
    pub fn target_schema(&self) -> &str {
        self.relationships
            .last()
            .map(|r| r.schema.as_str())
            .unwrap_or(&self.root)
    }

    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

/// A filter with its strategy settled and values deserialized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaFilter {
    pub path: SchemaPath,
    pub strategy: FilterStrategy,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Attribute,
    Relationship,
}

/// Resolves instruction paths against a view layer
pub struct SchemaResolver<'a, V: ViewLayer + ?Sized> {
    view: &'a V,
    default_attribute: String,
}

impl<'a, V: ViewLayer + ?Sized> SchemaResolver<'a, V> {
    pub fn new(view: &'a V, default_attribute: impl Into<String>) -> Self {
        Self {
            view,
            default_attribute: default_attribute.into(),
        }
    }

    /// Resolve a path that must end on an attribute (filters, sorts)
    pub fn resolve_attribute<I: Instruction>(
        &self,
        root: &str,
        instruction: &I,
    ) -> QueryResult<SchemaPath> {
        self.walk(root, instruction.source(), instruction.path(), Terminal::Attribute)
    }

    /// Resolve a path made only of relationships (includes)
    pub fn resolve_relationships<I: Instruction>(
        &self,
        root: &str,
        instruction: &I,
    ) -> QueryResult<SchemaPath> {
        self.walk(
            root,
            instruction.source(),
            instruction.path(),
            Terminal::Relationship,
        )
    }

    /// Resolve a filter, validating its strategy and deserializing its values
    pub fn resolve_filter(&self, root: &str, filter: &Filter) -> QueryResult<SchemaFilter> {
        let path = self.resolve_attribute(root, filter)?;
        let attribute = path.attribute.as_ref().ok_or_else(|| {
            QueryError::invalid_field_type(
                filter.source.as_str(),
                format!("Path '{}' does not end on an attribute.", path.path_string()),
            )
        })?;

        let strategy = filter
            .strategy
            .unwrap_or_else(|| FilterStrategy::new(attribute.default_strategy));

        if !attribute.allows(strategy.strategy) {
            return Err(QueryError::invalid_strategy(
                filter.source.as_str(),
                strategy,
                &path.path_string(),
                attribute.value_type.type_name(),
            ));
        }

        let values = filter
            .values
            .iter()
            .map(|raw| {
                self.view.deserialize(attribute, raw).map_err(|e| {
                    QueryError::invalid_value(
                        filter.source.as_str(),
                        format!("{} (field '{}').", e, path.path_string()),
                    )
                })
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(SchemaFilter {
            path,
            strategy,
            values,
        })
    }

    fn walk(
        &self,
        root: &str,
        source: &str,
        path: &[String],
        terminal: Terminal,
    ) -> QueryResult<SchemaPath> {
        if self.view.schema(root).is_none() {
            return Err(QueryError::unknown_schema(root));
        }

        let full = path.join(".");
        if path.is_empty() {
            return Err(QueryError::invalid_path(source, &full, ""));
        }

        let mut schema = root.to_string();
        let mut relationships = Vec::with_capacity(path.len());
        let mut attribute = None;

        for (i, segment) in path.iter().enumerate() {
            let is_last = i + 1 == path.len();
            let name = normalize(segment);

            let field = self
                .view
                .resolve_field(&schema, &name)
                .ok_or_else(|| QueryError::invalid_path(source, &full, segment))?;

            match field {
                ResolvedField::Relationship(rel) => {
                    if self.view.schema(&rel.schema).is_none() {
                        return Err(QueryError::unknown_schema(&rel.schema));
                    }

                    relationships.push(RelationshipSegment {
                        request_name: segment.clone(),
                        field_name: rel.field,
                        model_name: rel.attribute,
                        schema: rel.schema.clone(),
                        is_terminal: is_last,
                    });
                    schema = rel.schema;

                    if is_last && terminal == Terminal::Attribute {
                        attribute = Some(self.fallback_attribute(source, &full, &schema)?);
                    }
                }
                ResolvedField::Attribute(attr) => {
                    if !is_last || terminal == Terminal::Relationship {
                        return Err(QueryError::invalid_field_type(
                            source,
                            format!("Field '{}' in path '{}' is not a relationship.", segment, full),
                        ));
                    }
                    attribute = Some(attr);
                }
            }
        }

        Ok(SchemaPath {
            source: source.to_string(),
            path: path.to_vec(),
            root: root.to_string(),
            relationships,
            attribute,
        })
    }

    /// Identifier attribute compared against when a path ends on a relationship
    fn fallback_attribute(
        &self,
        source: &str,
        full: &str,
        schema: &str,
    ) -> QueryResult<AttributeDescriptor> {
        match self.view.resolve_field(schema, &self.default_attribute) {
            Some(ResolvedField::Attribute(attr)) => Ok(attr),
            _ => Err(QueryError::invalid_field_type(
                source,
                format!(
                    "Relationship path '{}' has no '{}' attribute to compare against.",
                    full, self.default_attribute
                ),
            )),
        }
    }
}
