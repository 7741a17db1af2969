//! Document composition

use std::collections::HashSet;

use serde::Serialize;

use crate::executor::{QueryOutput, Record};
use crate::planner::QueryPlan;
use crate::schema::{ResourceObject, SchemaDef, ViewLayer};

use super::links::Links;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// Matching rows before pagination
    pub total: u64,
}

/// Top-level JSON:API document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub data: Vec<ResourceObject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    pub meta: Meta,
    pub links: Links,
}

impl Document {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Renders query output through the view layer
pub struct DocumentComposer<'a, V: ViewLayer + ?Sized> {
    view: &'a V,
}

impl<'a, V: ViewLayer + ?Sized> DocumentComposer<'a, V> {
    pub fn new(view: &'a V) -> Self {
        Self { view }
    }

    /// Compose the document for `output`, linking under `base` with the
    /// client's `parameters`.
    ///
    /// Polymorphic rows render under the schema of their runtime type.
    /// A resource appears once, in `data` if it is a primary result.
    pub fn compose(
        &self,
        plan: &QueryPlan,
        output: &QueryOutput,
        base: &str,
        parameters: &[(String, String)],
    ) -> Document {
        let mut seen: HashSet<(String, String)> = HashSet::new();

        let data: Vec<ResourceObject> = output
            .records
            .iter()
            .filter_map(|record| self.render(plan, &plan.root_schema, record))
            .inspect(|resource| {
                seen.insert((resource.resource_type.clone(), resource.id.clone()));
            })
            .collect();

        let mut included = Vec::new();
        for group in &output.included {
            for record in &group.records {
                let Some(resource) = self.render(plan, &group.schema, record) else {
                    continue;
                };
                if seen.insert((resource.resource_type.clone(), resource.id.clone())) {
                    included.push(resource);
                }
            }
        }

        Document {
            data,
            included,
            meta: Meta {
                total: output.total,
            },
            links: Links::paginate(base, parameters, &plan.pagination, output.total),
        }
    }

    fn render(&self, plan: &QueryPlan, schema: &str, record: &Record) -> Option<ResourceObject> {
        let schema = self.runtime_schema(schema, record)?;
        self.view.serialize(
            &schema.name,
            &record.id,
            &record.row,
            plan.fieldset(&schema.resource_type),
        )
    }

    fn runtime_schema(&self, schema: &str, record: &Record) -> Option<&'a SchemaDef> {
        record
            .runtime_type
            .as_deref()
            .and_then(|t| self.view.schema_for_type(t))
            .or_else(|| self.view.schema(schema))
    }
}
