//! Model registry and the model-layer interface

use std::collections::BTreeMap;

use crate::value::ValueType;

use super::types::{ModelDef, RelationDef};

/// Relational model operations needed to plan joins
pub trait ModelLayer {
    fn model(&self, name: &str) -> Option<&ModelDef>;

    fn relationship(&self, model: &str, name: &str) -> Option<&RelationDef> {
        self.model(model)?.relationships.get(name)
    }

    fn column(&self, model: &str, name: &str) -> Option<&ValueType> {
        self.model(model)?.columns.get(name)
    }

    /// Names of every relationship from `source` to `target`
    fn relationships_between(&self, source: &str, target: &str) -> Vec<&str> {
        self.model(source)
            .map(|m| {
                m.relationships
                    .iter()
                    .filter(|(_, rel)| rel.target == target)
                    .map(|(name, _)| name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Immutable set of models, built at startup
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelDef>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model, returning the one it replaced
    pub fn insert(&mut self, model: ModelDef) -> Option<ModelDef> {
        self.models.insert(model.name.clone(), model)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelLayer for ModelRegistry {
    fn model(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }
}
