//! Registry loader for building the model and schema layers at startup
//!
//! A registry file declares both layers:
//!
//! ```json
//! {
//!   "models": [{"name": "person", "columns": {"id": {"type": "integer"}}}],
//!   "schemas": [{"name": "person", "type": "people", "model": "person",
//!                "fields": {"id": {"type": "integer", "key": true}}}],
//!   "config": {"default_limit": 50}
//! }
//! ```
//!
//! Every cross reference is checked before the registry is handed out, so a
//! loaded registry never produces `ModelMismatch` or `UnknownSchema`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::model::{ModelDef, ModelLayer, ModelRegistry};
use crate::observability::{Event, Logger};
use crate::schema::{FieldType, SchemaDef, SchemaRegistry, ViewLayer};

use super::errors::{LoaderError, LoaderResult};

/// On-disk registry layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub models: Vec<ModelDef>,
    #[serde(default)]
    pub schemas: Vec<SchemaDef>,
    #[serde(default)]
    pub config: QueryConfig,
}

/// Validated, immutable registries
#[derive(Debug, Clone)]
pub struct Registry {
    pub models: ModelRegistry,
    pub schemas: SchemaRegistry,
    pub config: QueryConfig,
}

/// Reads registry files and cross-checks both layers
pub struct RegistryLoader;

impl RegistryLoader {
    /// Load and validate a registry file
    pub fn load_file(path: &Path) -> LoaderResult<Registry> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::load_str(&content, &origin)
    }

    /// Parse and validate registry JSON; `origin` names it in errors
    pub fn load_str(content: &str, origin: &str) -> LoaderResult<Registry> {
        let file: RegistryFile =
            serde_json::from_str(content).map_err(|source| LoaderError::Parse {
                path: origin.to_string(),
                source,
            })?;
        Self::build(file)
    }

    /// Validate declarations and build the registries
    pub fn build(file: RegistryFile) -> LoaderResult<Registry> {
        file.config.validate().map_err(LoaderError::InvalidConfig)?;

        let mut models = ModelRegistry::new();
        for model in file.models {
            let name = model.name.clone();
            if models.insert(model).is_some() {
                return Err(LoaderError::Duplicate { kind: "model", name });
            }
        }

        let mut schemas = SchemaRegistry::new();
        let mut types = HashSet::new();
        for schema in file.schemas {
            if !types.insert(schema.resource_type.clone()) {
                return Err(LoaderError::Duplicate {
                    kind: "resource type",
                    name: schema.resource_type,
                });
            }
            let name = schema.name.clone();
            if schemas.insert(schema).is_some() {
                return Err(LoaderError::Duplicate { kind: "schema", name });
            }
        }

        for model in models.models() {
            Self::check_model(&models, model)?;
        }
        for schema in schemas.schemas() {
            Self::check_schema(&models, &schemas, schema)?;
        }

        Logger::info(
            Event::RegistryLoaded.as_str(),
            &[
                ("models", &models.len().to_string()),
                ("schemas", &schemas.len().to_string()),
            ],
        );

        Ok(Registry {
            models,
            schemas,
            config: file.config,
        })
    }

    fn check_model(models: &ModelRegistry, model: &ModelDef) -> LoaderResult<()> {
        let missing = |column: &str| {
            LoaderError::InvalidReference(format!(
                "model '{}' has no column '{}'",
                model.name, column
            ))
        };

        if !model.columns.contains_key(&model.primary_key) {
            return Err(missing(&model.primary_key));
        }
        if let Some(discriminator) = &model.discriminator {
            if !model.columns.contains_key(discriminator) {
                return Err(missing(discriminator));
            }
        }

        for (name, relation) in &model.relationships {
            if !model.columns.contains_key(&relation.local_column) {
                return Err(missing(&relation.local_column));
            }
            if models.column(&relation.target, &relation.remote_column).is_none() {
                return Err(LoaderError::InvalidReference(format!(
                    "relationship '{}.{}' joins missing column '{}.{}'",
                    model.name, name, relation.target, relation.remote_column
                )));
            }
        }

        Ok(())
    }

    fn check_schema(
        models: &ModelRegistry,
        schemas: &SchemaRegistry,
        schema: &SchemaDef,
    ) -> LoaderResult<()> {
        let model = models.model(&schema.model).ok_or_else(|| {
            LoaderError::InvalidReference(format!(
                "schema '{}' is bound to unknown model '{}'",
                schema.name, schema.model
            ))
        })?;

        for (field, def) in &schema.fields {
            let target = def.model_name(field);

            match &def.field_type {
                FieldType::Relationship { schema: related } => {
                    let related = schemas.schema(related).ok_or_else(|| {
                        LoaderError::InvalidReference(format!(
                            "field '{}.{}' names unknown schema '{}'",
                            schema.name, field, related
                        ))
                    })?;
                    let relation = model.relationships.get(target).ok_or_else(|| {
                        LoaderError::InvalidReference(format!(
                            "field '{}.{}' maps to missing relationship '{}.{}'",
                            schema.name, field, model.name, target
                        ))
                    })?;
                    if relation.target != related.model {
                        return Err(LoaderError::InvalidReference(format!(
                            "field '{}.{}' targets model '{}' but schema '{}' is bound to '{}'",
                            schema.name, field, relation.target, related.name, related.model
                        )));
                    }
                }
                _ => {
                    if !model.columns.contains_key(target) {
                        return Err(LoaderError::InvalidReference(format!(
                            "field '{}.{}' maps to missing column '{}.{}'",
                            schema.name, field, model.name, target
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
