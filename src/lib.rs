//! jsonapi-query - JSON:API query parameters to relational query plans
//!
//! A request's `filter`, `sort`, `include`, `page` and `fields` parameters
//! are lexed into instructions, resolved against a schema (view) layer and a
//! model (relational) layer, and translated into a [`planner::QueryPlan`]
//! whose joins are deduplicated and unambiguous. Every invalid parameter is
//! reported, not just the first.
//!
//! ```ignore
//! use jsonapi_query::loader::RegistryLoader;
//! use jsonapi_query::planner::Translator;
//!
//! let registry = RegistryLoader::load_file(path)?;
//! let translator = Translator::new(&registry.schemas, &registry.models, &registry.config);
//! let translation = translator.translate([("sort", "-age")], "person")?;
//! ```

pub mod cli;
pub mod compiler;
pub mod config;
pub mod document;
pub mod error;
pub mod executor;
pub mod loader;
pub mod model;
pub mod observability;
pub mod planner;
pub mod schema;
pub mod url;
pub mod value;

pub use config::QueryConfig;
pub use error::{ErrorDocument, QueryError, QueryErrorCode, QueryResult};
pub use planner::{QueryPlan, Translation, Translator};
