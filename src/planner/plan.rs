//! Query plan structures
//!
//! A plan is built once per request and consumed by the compiler. Every
//! column reference is scoped to the root or to one planned join, so
//! consumers of the same relationship chain read the same alias.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::compiler::Pagination;
use crate::url::{Direction, FilterStrategy};
use crate::value::{Value, ValueType};

use super::join::PlannedJoin;

/// Where a column is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Root,
    Join(usize),
}

/// A column on an aliased table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub scope: Scope,
    pub alias: String,
    pub column: String,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterClause {
    pub source: String,
    pub column: ColumnRef,
    pub value_type: ValueType,
    pub strategy: FilterStrategy,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortClause {
    pub source: String,
    pub column: ColumnRef,
    pub direction: Direction,
}

/// Eager load of one relationship chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeClause {
    pub source: String,
    pub path: Vec<String>,
    /// Planned join per segment, root side first
    pub joins: Vec<usize>,
    /// Target schema per segment
    pub schemas: Vec<String>,
}

impl IncludeClause {
    /// Planned join of the last segment
    pub fn terminal_join(&self) -> Option<usize> {
        self.joins.last().copied()
    }

    /// Schema of the last segment
    pub fn terminal_schema(&self) -> Option<&str> {
        self.schemas.last().map(String::as_str)
    }
}

/// Everything needed to compile one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub root_schema: String,
    pub root_model: String,
    pub root_alias: String,
    pub joins: Vec<PlannedJoin>,
    pub filters: Vec<FilterClause>,
    pub sorts: Vec<SortClause>,
    pub includes: Vec<IncludeClause>,
    pub pagination: Pagination,
    /// Sparse fieldsets by resource type
    pub fieldsets: BTreeMap<String, Vec<String>>,
}

impl QueryPlan {
    pub fn join(&self, id: usize) -> Option<&PlannedJoin> {
        self.joins.iter().find(|j| j.id == id)
    }

    /// Alias a scope resolves to
    pub fn alias(&self, scope: Scope) -> Option<&str> {
        match scope {
            Scope::Root => Some(&self.root_alias),
            Scope::Join(id) => self.join(id).map(|j| j.alias.as_str()),
        }
    }

    /// Joins from the root down to `id`, root side first
    pub fn chain(&self, id: usize) -> Vec<&PlannedJoin> {
        let mut chain = Vec::new();
        let mut next = self.join(id);
        while let Some(join) = next {
            chain.push(join);
            next = join.parent.and_then(|p| self.join(p));
        }
        chain.reverse();
        chain
    }

    /// Sparse fieldset requested for a resource type
    pub fn fieldset(&self, resource_type: &str) -> Option<&[String]> {
        self.fieldsets.get(resource_type).map(Vec::as_slice)
    }
}
