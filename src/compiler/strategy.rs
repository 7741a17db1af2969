//! Strategy functions: filter clauses to predicates
//!
//! - several values under any strategy but `in` are OR-combined
//! - a null value turns `eq`, `like` and `ilike` into `IS NULL`, and `ne`
//!   into `NOT IS NULL`
//! - a negated strategy wraps the whole result in NOT

use crate::planner::{ColumnRef, FilterClause};
use crate::url::Strategy;
use crate::value::Value;

use super::expr::{CompareOp, Predicate};

pub fn predicate(clause: &FilterClause) -> Predicate {
    let column = &clause.column;

    let base = match clause.strategy.strategy {
        Strategy::In => in_set(column, &clause.values),
        strategy => Predicate::any(
            clause
                .values
                .iter()
                .map(|value| single(strategy, column, value))
                .collect(),
        ),
    };

    if clause.strategy.negated {
        Predicate::not(base)
    } else {
        base
    }
}

fn in_set(column: &ColumnRef, values: &[Value]) -> Predicate {
    let (nulls, present): (Vec<&Value>, Vec<&Value>) = values.iter().partition(|v| v.is_null());

    let set = Predicate::InSet {
        column: column.clone(),
        values: present.into_iter().cloned().collect(),
    };

    if nulls.is_empty() {
        set
    } else {
        Predicate::any(vec![
            set,
            Predicate::IsNull {
                column: column.clone(),
            },
        ])
    }
}

fn single(strategy: Strategy, column: &ColumnRef, value: &Value) -> Predicate {
    let column = column.clone();

    if value.is_null() {
        match strategy {
            Strategy::Eq | Strategy::Like | Strategy::Ilike => return Predicate::IsNull { column },
            Strategy::Ne => return Predicate::not(Predicate::IsNull { column }),
            _ => {}
        }
    }

    let op = match strategy {
        Strategy::Like | Strategy::Ilike => {
            return Predicate::Contains {
                column,
                needle: value.to_string(),
                case_insensitive: strategy == Strategy::Ilike,
            }
        }
        Strategy::Ne => CompareOp::Ne,
        Strategy::Gt => CompareOp::Gt,
        Strategy::Gte => CompareOp::Gte,
        Strategy::Lt => CompareOp::Lt,
        Strategy::Lte => CompareOp::Lte,
        Strategy::Eq | Strategy::In => CompareOp::Eq,
    };

    Predicate::compare(column, op, value.clone())
}
