//! Schema (view) layer
//!
//! Schemas are explicit registry entries; nothing is discovered at runtime.
//! The layer validates request field names, renames them to model-level
//! names, coerces raw filter values and renders resource objects.

mod registry;
mod resolver;
mod types;

pub use registry::{SchemaRegistry, ViewLayer};
pub use resolver::{normalize, RelationshipSegment, SchemaFilter, SchemaPath, SchemaResolver};
pub use types::{
    AttributeDescriptor, FieldDef, FieldType, RelationshipDescriptor, ResolvedField,
    ResourceObject, SchemaDef,
};
