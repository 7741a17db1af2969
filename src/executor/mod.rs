//! In-memory relational data layer
//!
//! Implements [`DataLayer`] and the compiler's `QueryBuilder` over rows held
//! in memory, so compiled plans can be executed end to end without a
//! database.
//!
//! # Execution Flow (strict order)
//!
//! 1. Expand root rows along planned joins (left outer)
//! 2. Filter tuples with three-valued predicate logic
//! 3. Sort matched rows
//! 4. Count, then apply the window
//! 5. Collect included rows per include chain

mod errors;
mod executor;
mod filters;
mod result;
mod sorter;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use executor::{DataLayer, MemoryDatabase, MemoryQuery};
pub use filters::{PredicateFilter, Tuple};
pub use result::{IncludedGroup, QueryOutput, Record};
pub use sorter::ResultSorter;
