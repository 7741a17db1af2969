//! Plan compilation onto a query builder

use crate::planner::{ColumnRef, IncludeClause, PlannedJoin, QueryPlan};
use crate::url::Direction;

use super::expr::Predicate;
use super::pagination::Window;
use super::strategy;

/// Operations a relational data layer exposes for building one query
pub trait QueryBuilder {
    /// Join a planned relationship under its alias; parents come first
    fn apply_join(&mut self, join: &PlannedJoin);

    /// AND a predicate into the WHERE clause
    fn apply_filter(&mut self, predicate: Predicate);

    /// Append an ordering term
    fn apply_sort(&mut self, column: &ColumnRef, direction: Direction);

    fn apply_window(&mut self, window: Window);

    /// Eager-load the rows along a planned chain
    fn apply_include(&mut self, include: &IncludeClause);
}

/// Apply every clause of a plan to a builder.
///
/// Joins first, in planning order, then filters, sorts in client order, the
/// window and finally includes.
pub fn compile<B: QueryBuilder + ?Sized>(plan: &QueryPlan, builder: &mut B) {
    for join in &plan.joins {
        builder.apply_join(join);
    }

    for filter in &plan.filters {
        builder.apply_filter(strategy::predicate(filter));
    }

    for sort in &plan.sorts {
        builder.apply_sort(&sort.column, sort.direction);
    }

    builder.apply_window(plan.pagination.window);

    for include in &plan.includes {
        builder.apply_include(include);
    }
}
