//! Relational model layer
//!
//! Models describe tables: typed columns, a primary key and relationships
//! with explicit join conditions. The resolver turns schema paths into join
//! descriptors and terminal columns.

mod registry;
mod resolver;
mod types;

pub use registry::{ModelLayer, ModelRegistry};
pub use resolver::{JoinCondition, JoinDescriptor, JoinKey, ModelPath, ModelResolver};
pub use types::{ModelDef, RelationDef};
