//! Explain output
//!
//! Produces deterministic, human-readable plan descriptions for the CLI.

use std::fmt;

use crate::compiler::{predicate, PaginationMode};
use crate::error::QueryError;
use crate::url::Direction;

use super::plan::QueryPlan;

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether translation succeeded
    pub accepted: bool,
    /// `<model> AS <alias>`
    pub root: Option<String>,
    /// One line per planned join, in application order
    pub joins: Vec<String>,
    pub predicates: Vec<String>,
    pub order: Vec<String>,
    pub includes: Vec<String>,
    /// `limit N offset M`, tagged with the client's strategy
    pub window: Option<String>,
    /// `(code, parameter, detail)` per rejected parameter
    pub rejections: Vec<(String, String, String)>,
}

impl ExplainPlan {
    /// Creates an explain plan from an accepted query plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let joins = plan
            .joins
            .iter()
            .map(|join| {
                let parent = plan.alias(join.parent_scope()).unwrap_or(&plan.root_alias);
                format!(
                    "LEFT JOIN {} AS {} ON {}.{} = {}.{}",
                    join.descriptor.target,
                    join.alias,
                    parent,
                    join.descriptor.condition.local_column,
                    join.alias,
                    join.descriptor.condition.remote_column,
                )
            })
            .collect();

        let predicates = plan.filters.iter().map(|f| predicate(f).to_string()).collect();

        let order = plan
            .sorts
            .iter()
            .map(|s| {
                let direction = match s.direction {
                    Direction::Ascending => "ASC",
                    Direction::Descending => "DESC",
                };
                format!("{} {}", s.column, direction)
            })
            .collect();

        let includes = plan
            .includes
            .iter()
            .map(|i| {
                let aliases: Vec<&str> = i
                    .joins
                    .iter()
                    .filter_map(|id| plan.join(*id).map(|j| j.alias.as_str()))
                    .collect();
                format!("{} via {}", i.path.join("."), aliases.join(" -> "))
            })
            .collect();

        let mode = match plan.pagination.mode {
            PaginationMode::Offset => "offset",
            PaginationMode::Page => "page",
        };
        let window = format!(
            "limit {} offset {} ({})",
            plan.pagination.window.limit, plan.pagination.window.offset, mode
        );

        Self {
            accepted: true,
            root: Some(format!("{} AS {}", plan.root_model, plan.root_alias)),
            joins,
            predicates,
            order,
            includes,
            window: Some(window),
            rejections: Vec::new(),
        }
    }

    /// Creates an explain plan from rejected parameters or a fatal error
    pub fn from_errors(errors: &[QueryError]) -> Self {
        Self {
            accepted: false,
            root: None,
            joins: Vec::new(),
            predicates: Vec::new(),
            order: Vec::new(),
            includes: Vec::new(),
            window: None,
            rejections: errors
                .iter()
                .map(|e| {
                    (
                        e.code().code().to_string(),
                        e.source().unwrap_or("-").to_string(),
                        e.detail().to_string(),
                    )
                })
                .collect(),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            for (code, parameter, detail) in &self.rejections {
                writeln!(f, "  - [{}] {}: {}", code, parameter, detail)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        if let Some(root) = &self.root {
            writeln!(f, "From: {}", root)?;
        }
        for join in &self.joins {
            writeln!(f, "  {}", join)?;
        }
        if !self.predicates.is_empty() {
            writeln!(f, "Where:")?;
            for pred in &self.predicates {
                writeln!(f, "  - {}", pred)?;
            }
        }
        if !self.order.is_empty() {
            writeln!(f, "Order: {}", self.order.join(", "))?;
        }
        if let Some(window) = &self.window {
            writeln!(f, "Window: {}", window)?;
        }
        if !self.includes.is_empty() {
            writeln!(f, "Include:")?;
            for include in &self.includes {
                writeln!(f, "  - {}", include)?;
            }
        }

        Ok(())
    }
}
