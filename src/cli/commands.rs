//! CLI command implementations
//!
//! Every command loads the configuration, then the registry it points at,
//! before touching a query. Paths in the configuration file are relative to
//! the file itself.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::compiler::compile;
use crate::document::{Document, DocumentComposer};
use crate::executor::{DataLayer, MemoryDatabase};
use crate::loader::{Registry, RegistryLoader};
use crate::observability::{Event, Logger, MetricsRegistry, Severity};
use crate::planner::{ExplainPlan, Translation, Translator};
use crate::schema::{SchemaDef, ViewLayer};
use crate::url::parse_query_string;

use super::args::Command;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{write_error, write_json, write_response, write_text};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Registry file declaring models, schemas and query settings (required)
    pub registry: PathBuf,

    /// Rows served by `fetch` (optional)
    #[serde(default)]
    pub dataset: Option<PathBuf>,

    /// Prefix of pagination links (optional, default "")
    #[serde(default)]
    pub base_url: String,

    /// Overrides the registry's `log_level` (optional)
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(skip)]
    root: PathBuf,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;

        Logger::info(
            Event::ConfigLoaded.as_str(),
            &[("path", &path.display().to_string())],
        );

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.registry.as_os_str().is_empty() {
            return Err(CliError::config_error("registry must not be empty"));
        }

        if let Some(level) = &self.log_level {
            if Severity::parse(level).is_none() {
                return Err(CliError::config_error(format!(
                    "Invalid log_level: '{}'",
                    level
                )));
            }
        }

        Ok(())
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry)
    }

    pub fn dataset_path(&self) -> Option<PathBuf> {
        self.dataset.as_ref().map(|dataset| self.root.join(dataset))
    }
}

/// Loaded registry plus the optional dataset
pub struct Session {
    registry: Registry,
    database: Option<MemoryDatabase>,
    base_url: String,
}

impl Session {
    /// Load everything the configuration names
    pub fn open(config: &Config) -> CliResult<Self> {
        let registry = RegistryLoader::load_file(&config.registry_path())?;

        let level = config
            .log_level
            .as_deref()
            .unwrap_or(&registry.config.log_level);
        let severity = Severity::parse(level)
            .ok_or_else(|| CliError::config_error(format!("Invalid log_level: '{}'", level)))?;
        Logger::set_min_severity(severity);

        let database = match config.dataset_path() {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    CliError::registry_error(format!(
                        "Failed to read dataset {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let dataset: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
                    CliError::registry_error(format!(
                        "Invalid dataset JSON {}: {}",
                        path.display(),
                        e
                    ))
                })?;

                let mut database = MemoryDatabase::new(registry.models.clone());
                database.load_dataset(&dataset)?;
                Some(database)
            }
            None => None,
        };

        Ok(Self {
            registry,
            database,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Root schema by registry name, falling back to resource type
    pub fn schema(&self, name: &str) -> CliResult<&SchemaDef> {
        let schemas = &self.registry.schemas;
        schemas
            .schema(name)
            .or_else(|| schemas.schema_for_type(name))
            .ok_or_else(|| CliError::config_error(format!("Unknown schema or type: '{}'", name)))
    }

    /// Translate a raw query string for a root schema
    pub fn translate(&self, resource: &str, query: &str) -> CliResult<Translation> {
        let schema = self.schema(resource)?;
        let translator = Translator::new(
            &self.registry.schemas,
            &self.registry.models,
            &self.registry.config,
        );

        translator
            .translate(parse_query_string(query), &schema.name)
            .map_err(|e| CliError::configuration_fault(e.to_string()))
    }

    /// Translate, execute and render a query string.
    ///
    /// Rejected parameters come back as the error document.
    pub fn fetch(&self, resource: &str, query: &str) -> CliResult<Result<Document, Translation>> {
        let database = self
            .database
            .as_ref()
            .ok_or_else(|| CliError::config_error("fetch requires a dataset in the config"))?;

        let translation = self.translate(resource, query)?;
        if !translation.is_valid() {
            return Ok(Err(translation));
        }
        let plan = translation.plan;

        let mut builder = database.query(&plan.root_model)?;
        compile(&plan, &mut builder);
        let output = database.execute(&builder)?;

        let schema = self.schema(&plan.root_schema)?;
        let base = format!("{}/{}", self.base_url, schema.resource_type);
        let parameters = parse_query_string(query);

        Ok(Ok(DocumentComposer::new(&self.registry.schemas).compose(
            &plan,
            &output,
            &base,
            &parameters,
        )))
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. Failures
/// other than rejected parameters are also reported as an error response.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);

    if let Err(e) = &result {
        if e.code() != &CliErrorCode::QueryRejected {
            write_error(e.code_str(), e.message())?;
        }
    }

    result
}

/// Execute a CLI command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { config } => check(&config),
        Command::Translate {
            config,
            resource,
            explain,
            query,
        } => translate(&config, &resource, &query, explain),
        Command::Fetch {
            config,
            resource,
            query,
        } => fetch(&config, &resource, &query),
    }
}

/// Load the configuration, registry and dataset, then report what was found
fn check(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let session = Session::open(&config)?;

    let registry = session.registry();
    let mut types: Vec<&str> = registry
        .schemas
        .schemas()
        .map(|schema| schema.resource_type.as_str())
        .collect();
    types.sort_unstable();

    write_response(json!({
        "models": registry.models.len(),
        "schemas": registry.schemas.len(),
        "types": types,
        "dataset": session.database.is_some(),
    }))
}

fn translate(config_path: &Path, resource: &str, query: &str, explain: bool) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let session = Session::open(&config)?;
    let translation = session.translate(resource, query)?;

    if explain {
        let explained = if translation.is_valid() {
            ExplainPlan::from_plan(&translation.plan)
        } else {
            ExplainPlan::from_errors(&translation.errors)
        };
        write_text(&explained.to_string())?;
    } else if let Some(document) = translation.error_document() {
        write_json(&serde_json::to_value(&document)?)?;
    } else {
        write_response(serde_json::to_value(&translation.plan)?)?;
    }

    if translation.is_valid() {
        Ok(())
    } else {
        Err(CliError::query_rejected(translation.errors.len()))
    }
}

fn fetch(config_path: &Path, resource: &str, query: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let session = Session::open(&config)?;

    let result = session.fetch(resource, query)?;
    Logger::trace("METRICS", &[("snapshot", &MetricsRegistry::global().to_json())]);

    match result {
        Ok(document) => write_json(&document.to_json()),
        Err(translation) => {
            if let Some(document) = translation.error_document() {
                write_json(&serde_json::to_value(&document)?)?;
            }
            Err(CliError::query_rejected(translation.errors.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path, with_dataset: bool) -> PathBuf {
        let registry = json!({
            "models": [
                {
                    "name": "person",
                    "columns": {
                        "id": {"type": "integer"},
                        "name": {"type": "string"},
                        "age": {"type": "integer"}
                    },
                    "relationships": {
                        "student": {"target": "student", "local_column": "id", "remote_column": "person_id"}
                    }
                },
                {
                    "name": "student",
                    "columns": {"id": {"type": "integer"}, "person_id": {"type": "integer"}}
                }
            ],
            "schemas": [
                {
                    "name": "person", "type": "people", "model": "person",
                    "fields": {
                        "id": {"type": "integer", "key": true},
                        "name": {"type": "string"},
                        "age": {"type": "integer"},
                        "student": {"type": "relationship", "schema": "student"}
                    }
                },
                {
                    "name": "student", "type": "students", "model": "student",
                    "fields": {"id": {"type": "integer", "key": true}}
                }
            ],
            "config": {"log_level": "error"}
        });
        fs::write(dir.join("registry.json"), registry.to_string()).unwrap();

        let dataset = json!({
            "person": [
                {"id": 1, "name": "Ann", "age": 5},
                {"id": 2, "name": "Bob", "age": 10}
            ],
            "student": [{"id": 7, "person_id": 2}]
        });
        fs::write(dir.join("dataset.json"), dataset.to_string()).unwrap();

        let mut config = json!({"registry": "registry.json", "base_url": "https://api.test/"});
        if with_dataset {
            config["dataset"] = json!("dataset.json");
        }
        let path = dir.join("config.json");
        fs::write(&path, config.to_string()).unwrap();
        path
    }

    fn open(with_dataset: bool) -> (TempDir, Session) {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(temp_dir.path(), with_dataset);
        let config = Config::load(&path).unwrap();
        let session = Session::open(&config).unwrap();
        (temp_dir, session)
    }

    #[test]
    fn test_config_paths_relative_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(temp_dir.path(), true);
        let config = Config::load(&path).unwrap();

        assert_eq!(config.registry_path(), temp_dir.path().join("registry.json"));
        assert_eq!(
            config.dataset_path(),
            Some(temp_dir.path().join("dataset.json"))
        );
    }

    #[test]
    fn test_invalid_config_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"registry": "r.json", "log_level": "loud"}"#).unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_missing_registry_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"registry": "missing.json"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        let err = Session::open(&config).err().unwrap();
        assert_eq!(err.code(), &CliErrorCode::RegistryError);
        assert!(err.message().contains("LOADER_IO"));
    }

    #[test]
    fn test_schema_by_name_or_type() {
        let (_dir, session) = open(false);
        assert_eq!(session.schema("person").unwrap().name, "person");
        assert_eq!(session.schema("people").unwrap().name, "person");
        assert!(session.schema("ghosts").is_err());
    }

    #[test]
    fn test_translate_valid() {
        let (_dir, session) = open(false);
        let translation = session
            .translate("people", "filter[student.id]=7&sort=-age")
            .unwrap();

        assert!(translation.is_valid());
        assert_eq!(translation.plan.root_model, "person");
        assert_eq!(translation.plan.joins.len(), 1);
    }

    #[test]
    fn test_translate_collects_errors() {
        let (_dir, session) = open(false);
        let translation = session
            .translate("people", "filter[nope]=1&page[limit]=x")
            .unwrap();

        assert_eq!(translation.errors.len(), 2);
        assert!(translation.error_document().is_some());
    }

    #[test]
    fn test_fetch_requires_dataset() {
        let (_dir, session) = open(false);
        let err = session.fetch("people", "").err().unwrap();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_fetch_document() {
        let (_dir, session) = open(true);
        let document = session
            .fetch("people", "filter[age]=gte:10")
            .unwrap()
            .unwrap();

        assert_eq!(document.meta.total, 1);
        assert_eq!(document.data.len(), 1);
        assert_eq!(document.data[0].id, "2");
        assert!(document.links.self_link.starts_with("https://api.test/people?"));
    }

    #[test]
    fn test_fetch_rejected() {
        let (_dir, session) = open(true);
        let rejected = session.fetch("people", "sort=ghost").unwrap().unwrap_err();
        assert_eq!(rejected.errors.len(), 1);
    }
}
