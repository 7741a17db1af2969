//! # Translator
//!
//! Drives one request through every stage:
//!
//! 1. lex parameters into instructions
//! 2. resolve each path against the view layer, then the model layer
//! 3. merge join chains in the join planner
//! 4. compute the window and sparse fieldsets
//!
//! Parameter errors are collected per instruction so the client sees all
//! of them; configuration faults abort the request.

use std::collections::BTreeMap;

use crate::compiler::{paginate, Pagination};
use crate::config::QueryConfig;
use crate::error::{ErrorAggregator, ErrorDocument, QueryError, QueryResult};
use crate::model::{ModelLayer, ModelPath, ModelResolver};
use crate::observability::{Event, Logger, MetricsRegistry, ObservationScope};
use crate::schema::{normalize, ResolvedField, SchemaResolver, ViewLayer};
use crate::url::{parse_parameters, FieldSet, Instruction, Instructions};

use super::join::JoinPlanner;
use super::plan::{ColumnRef, FilterClause, IncludeClause, QueryPlan, Scope, SortClause};

/// Outcome of translating one request
#[derive(Debug, Clone)]
pub struct Translation {
    pub plan: QueryPlan,
    /// Parameter errors; the plan must not be executed unless empty
    pub errors: Vec<QueryError>,
}

impl Translation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// JSON:API error document, `None` when the translation is valid
    pub fn error_document(&self) -> Option<ErrorDocument> {
        if self.is_valid() {
            None
        } else {
            Some(ErrorDocument::from(self.errors.as_slice()))
        }
    }

    /// The plan, or the error document describing every rejected parameter
    pub fn into_plan(self) -> Result<QueryPlan, ErrorDocument> {
        if self.errors.is_empty() {
            Ok(self.plan)
        } else {
            Err(ErrorDocument::from(self.errors.as_slice()))
        }
    }
}

/// Translates query parameters into query plans
///
/// Holds only shared references; one translator serves any number of
/// requests.
pub struct Translator<'a, V: ViewLayer + ?Sized, M: ModelLayer + ?Sized> {
    view: &'a V,
    models: &'a M,
    config: &'a QueryConfig,
}

impl<'a, V: ViewLayer + ?Sized, M: ModelLayer + ?Sized> Translator<'a, V, M> {
    pub fn new(view: &'a V, models: &'a M, config: &'a QueryConfig) -> Self {
        Self {
            view,
            models,
            config,
        }
    }

    /// Translate raw `(key, value)` parameters for a root schema
    pub fn translate<I, K, T>(&self, parameters: I, root_schema: &str) -> QueryResult<Translation>
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        T: AsRef<str>,
    {
        let instructions = parse_parameters(parameters);
        self.translate_instructions(&instructions, root_schema)
    }

    /// Translate already lexed instructions
    pub fn translate_instructions(
        &self,
        instructions: &Instructions,
        root_schema: &str,
    ) -> QueryResult<Translation> {
        let metrics = MetricsRegistry::global();
        metrics.increment_translations();

        let scope = ObservationScope::with_fields("TRANSLATE", &[("schema", root_schema)]);

        match self.build(instructions, root_schema) {
            Ok(translation) => {
                let errors = translation.errors.len().to_string();
                let joins = translation.plan.joins.len().to_string();

                if !translation.is_valid() {
                    metrics.increment_translations_rejected();
                    metrics.add_parameter_errors(translation.errors.len() as u64);
                    for err in &translation.errors {
                        Logger::info(
                            Event::ParameterRejected.as_str(),
                            &[
                                ("code", err.code().name()),
                                ("parameter", err.source().unwrap_or("")),
                                ("detail", err.detail()),
                            ],
                        );
                    }
                    Logger::info(
                        Event::TranslationRejected.as_str(),
                        &[("schema", root_schema), ("errors", &errors)],
                    );
                }

                scope.complete_with_fields(&[("errors", &errors), ("joins", &joins)]);
                Ok(translation)
            }
            Err(err) => {
                metrics.increment_fatal_errors();
                Logger::error(
                    Event::ConfigurationFault.as_str(),
                    &[("code", err.code().name()), ("detail", err.detail())],
                );
                scope.fail_fatal(err.detail());
                Err(err)
            }
        }
    }

    fn build(&self, instructions: &Instructions, root: &str) -> QueryResult<Translation> {
        let schemas = SchemaResolver::new(self.view, self.config.default_attribute.as_str());
        let models = ModelResolver::new(self.models, self.view);

        let root_model = models.model_for_schema(root)?;
        let mut planner = JoinPlanner::new(root_model);
        let mut errors = ErrorAggregator::new();

        let mut filters = Vec::with_capacity(instructions.filters.len());
        for filter in &instructions.filters {
            let Some(resolved) = errors.recover(schemas.resolve_filter(root, filter))? else {
                continue;
            };
            let model_path = models.resolve(&resolved.path)?;
            let column = self.column_ref(&mut planner, &model_path, filter)?;
            let value_type = match &resolved.path.attribute {
                Some(attribute) => attribute.value_type.clone(),
                None => return Err(missing_attribute(filter)),
            };

            filters.push(FilterClause {
                source: filter.source.clone(),
                column,
                value_type,
                strategy: resolved.strategy,
                values: resolved.values,
            });
        }

        let mut sorts = Vec::with_capacity(instructions.sorts.len());
        for sort in &instructions.sorts {
            let Some(path) = errors.recover(schemas.resolve_attribute(root, sort))? else {
                continue;
            };
            let model_path = models.resolve(&path)?;
            let column = self.column_ref(&mut planner, &model_path, sort)?;

            sorts.push(SortClause {
                source: sort.source.clone(),
                column,
                direction: sort.direction,
            });
        }

        let mut includes = Vec::with_capacity(instructions.includes.len());
        for include in &instructions.includes {
            let Some(path) = errors.recover(schemas.resolve_relationships(root, include))? else {
                continue;
            };
            let model_path = models.resolve(&path)?;
            let joins = planner.plan_chain(&model_path.joins)?;

            includes.push(IncludeClause {
                source: include.source.clone(),
                path: include.path.clone(),
                joins,
                schemas: path.relationships.iter().map(|r| r.schema.clone()).collect(),
            });
        }

        let pagination = match paginate(&instructions.paginators, self.config) {
            Ok(pagination) => pagination,
            Err(rejected) => {
                for err in rejected {
                    errors.push(err);
                }
                Pagination::defaults(self.config)
            }
        };

        let mut fieldsets = BTreeMap::new();
        for fieldset in &instructions.fieldsets {
            if let Some(fields) = errors.recover(self.resolve_fieldset(fieldset))? {
                fieldsets.insert(fieldset.resource_type.clone(), fields);
            }
        }

        let planned = planner.len() as u64;
        let reused = planner.reused();
        let metrics = MetricsRegistry::global();
        metrics.add_joins_planned(planned);
        metrics.add_joins_reused(reused);
        if planned > 0 {
            Logger::trace(
                Event::JoinPlanned.as_str(),
                &[("schema", root), ("joins", &planned.to_string())],
            );
        }
        if reused > 0 {
            Logger::trace(
                Event::JoinReused.as_str(),
                &[("schema", root), ("reused", &reused.to_string())],
            );
        }

        let root_alias = planner.root_alias().to_string();
        let plan = QueryPlan {
            root_schema: root.to_string(),
            root_model: root_model.to_string(),
            root_alias,
            joins: planner.into_joins(),
            filters,
            sorts,
            includes,
            pagination,
            fieldsets,
        };

        Ok(Translation {
            plan,
            errors: errors.into_errors(),
        })
    }

    /// Plan the joins of a resolved path and reference its terminal column
    fn column_ref<I: Instruction>(
        &self,
        planner: &mut JoinPlanner,
        model_path: &ModelPath,
        instruction: &I,
    ) -> QueryResult<ColumnRef> {
        let scope: Scope = planner.plan(&model_path.joins)?;
        let column = model_path
            .column
            .clone()
            .ok_or_else(|| missing_attribute(instruction))?;

        Ok(ColumnRef {
            scope,
            alias: planner.alias(scope).to_string(),
            column,
        })
    }

    /// Normalized attribute names of a sparse fieldset
    fn resolve_fieldset(&self, fieldset: &FieldSet) -> QueryResult<Vec<String>> {
        let schema = self
            .view
            .schema_for_type(&fieldset.resource_type)
            .ok_or_else(|| {
                QueryError::invalid_path(
                    fieldset.source.as_str(),
                    &fieldset.resource_type,
                    &fieldset.resource_type,
                )
            })?;

        let mut fields = Vec::with_capacity(fieldset.fields.len());
        for field in &fieldset.fields {
            let name = normalize(field);
            match self.view.resolve_field(&schema.name, &name) {
                Some(ResolvedField::Attribute(_)) | Some(ResolvedField::Relationship(_)) => {
                    if !fields.contains(&name) {
                        fields.push(name);
                    }
                }
                None => {
                    return Err(QueryError::invalid_path(
                        fieldset.source.as_str(),
                        &fieldset.fields.join(","),
                        field,
                    ))
                }
            }
        }

        Ok(fields)
    }
}

fn missing_attribute<I: Instruction>(instruction: &I) -> QueryError {
    QueryError::model_mismatch(format!(
        "Path '{}' of '{}' resolved without a terminal column.",
        instruction.path_string(),
        instruction.source()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorCode;
    use crate::model::{ModelDef, ModelRegistry, RelationDef};
    use crate::schema::{FieldDef, FieldType, SchemaDef, SchemaRegistry};
    use crate::url::Direction;
    use crate::value::{Value, ValueType};

    fn layers() -> (SchemaRegistry, ModelRegistry) {
        let mut models = ModelRegistry::new();
        models.insert(
            ModelDef::new("person")
                .column("id", ValueType::Integer)
                .column("name", ValueType::String)
                .column("age", ValueType::Integer)
                .relationship("student", RelationDef::new("student", "id", "person_id")),
        );
        models.insert(
            ModelDef::new("student")
                .column("id", ValueType::Integer)
                .column("person_id", ValueType::Integer)
                .column("school_id", ValueType::Integer)
                .relationship("school", RelationDef::new("school", "school_id", "id")),
        );
        models.insert(
            ModelDef::new("school")
                .column("id", ValueType::Integer)
                .column("name", ValueType::String),
        );

        let mut schemas = SchemaRegistry::new();
        schemas.insert(
            SchemaDef::new("person", "people", "person")
                .field("id", FieldDef::key(FieldType::Integer))
                .field("name", FieldDef::new(FieldType::String))
                .field("age", FieldDef::new(FieldType::Integer))
                .field("student", FieldDef::relationship("student")),
        );
        schemas.insert(
            SchemaDef::new("student", "students", "student")
                .field("id", FieldDef::key(FieldType::Integer))
                .field("school", FieldDef::relationship("school")),
        );
        schemas.insert(
            SchemaDef::new("school", "schools", "school")
                .field("id", FieldDef::key(FieldType::Integer))
                .field("title", FieldDef::new(FieldType::String).with_attribute("name")),
        );

        (schemas, models)
    }

    fn translate(query: &[(&str, &str)]) -> QueryResult<Translation> {
        let (schemas, models) = layers();
        let config = QueryConfig::default();
        Translator::new(&schemas, &models, &config).translate(query.iter().copied(), "person")
    }

    #[test]
    fn test_filter_on_root_attribute() {
        let translation = translate(&[("filter[age]", "gte:10")]).unwrap();
        assert!(translation.is_valid());

        let filter = &translation.plan.filters[0];
        assert_eq!(filter.column.scope, Scope::Root);
        assert_eq!(filter.column.to_string(), "person.age");
        assert_eq!(filter.values, vec![Value::Integer(10)]);
        assert!(translation.plan.joins.is_empty());
    }

    #[test]
    fn test_filter_sort_and_include_share_joins() {
        let translation = translate(&[
            ("filter[student.school.title]", "Harvard"),
            ("sort", "-student.school.title"),
            ("include", "student.school"),
        ])
        .unwrap();
        assert!(translation.is_valid());

        let plan = &translation.plan;
        assert_eq!(plan.joins.len(), 2);
        assert_eq!(plan.filters[0].column.to_string(), "school.name");
        assert_eq!(plan.sorts[0].column, plan.filters[0].column);
        assert_eq!(plan.sorts[0].direction, Direction::Descending);
        assert_eq!(plan.includes[0].joins, vec![0, 1]);
        assert_eq!(plan.includes[0].terminal_schema(), Some("school"));
    }

    #[test]
    fn test_every_parameter_error_reported() {
        let translation = translate(&[
            ("filter[x]", "1"),
            ("sort", "y"),
            ("include", "z"),
            ("page[limit]", "abc"),
        ])
        .unwrap();

        let codes: Vec<_> = translation.errors.iter().map(|e| e.code()).collect();
        assert_eq!(
            codes,
            vec![
                QueryErrorCode::InvalidPath,
                QueryErrorCode::InvalidPath,
                QueryErrorCode::InvalidPath,
                QueryErrorCode::InvalidPaginationValue,
            ]
        );
        let doc = translation.error_document().unwrap();
        assert_eq!(doc.errors.len(), 4);
        assert_eq!(doc.status(), 400);
    }

    #[test]
    fn test_valid_instructions_survive_rejected_siblings() {
        let translation = translate(&[("filter[age]", "like:1"), ("sort", "name")]).unwrap();
        assert_eq!(translation.errors.len(), 1);
        assert_eq!(translation.errors[0].code(), QueryErrorCode::InvalidStrategy);
        assert_eq!(translation.plan.sorts.len(), 1);
    }

    #[test]
    fn test_unknown_root_is_fatal() {
        let (schemas, models) = layers();
        let config = QueryConfig::default();
        let err = Translator::new(&schemas, &models, &config)
            .translate(Vec::<(&str, &str)>::new(), "ghost")
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::UnknownSchema);
    }

    #[test]
    fn test_model_mismatch_is_fatal() {
        let (mut schemas, models) = layers();
        schemas.insert(
            SchemaDef::new("person", "people", "person")
                .field("id", FieldDef::key(FieldType::Integer))
                .field("nickname", FieldDef::new(FieldType::String)),
        );
        let config = QueryConfig::default();
        let err = Translator::new(&schemas, &models, &config)
            .translate([("filter[nickname]", "x")], "person")
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::ModelMismatch);
    }

    #[test]
    fn test_fieldsets_validated() {
        let translation = translate(&[
            ("fields[schools]", "title"),
            ("fields[people]", "name,ghost"),
            ("fields[planets]", "name"),
        ])
        .unwrap();

        assert_eq!(translation.plan.fieldset("schools"), Some(&["title".to_string()][..]));
        assert_eq!(translation.errors.len(), 2);
        assert!(translation
            .errors
            .iter()
            .all(|e| e.code() == QueryErrorCode::InvalidPath));
    }

    #[test]
    fn test_translation_is_idempotent() {
        let query = [("filter[student.school]", "1,2"), ("page[size]", "5")];
        let a = translate(&query).unwrap();
        let b = translate(&query).unwrap();
        assert_eq!(a.plan, b.plan);
        assert_eq!(a.plan.pagination.window.offset, 0);
        assert_eq!(a.plan.filters[0].column.to_string(), "school.id");
    }
}
