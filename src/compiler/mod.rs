//! Query compiler
//!
//! Turns a plan into operations on a data layer's [`QueryBuilder`]:
//! predicates from strategy functions, ordering, the result window and
//! eager loads.

mod compile;
mod expr;
mod pagination;
mod strategy;

pub use compile::{compile, QueryBuilder};
pub use expr::{CompareOp, Predicate};
pub use pagination::{paginate, Pagination, PaginationMode, Window};
pub use strategy::predicate;
