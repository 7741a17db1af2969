//! Query planner
//!
//! Translates request parameters into a [`QueryPlan`].
//!
//! # Design Principles
//!
//! - Deterministic: same parameters and registries produce the same plan
//! - Complete: every rejected parameter is reported, not just the first
//! - Scoped: each column is read from exactly one alias
//!
//! Join chains are merged by their full sequence of join keys, so a filter,
//! a sort and an include on `student.school` share one join.

mod explain;
mod join;
mod plan;
mod translate;

pub use explain::ExplainPlan;
pub use join::{JoinPlanner, PlannedJoin};
pub use plan::{ColumnRef, FilterClause, IncludeClause, QueryPlan, Scope, SortClause};
pub use translate::{Translation, Translator};
