//! Predicate evaluation for the in-memory data layer
//!
//! Predicates are evaluated over a tuple: one row per alias, produced by
//! expanding a root row along its joins. An alias missing from the tuple is
//! an unmatched outer join and reads as null.
//!
//! Evaluation is three-valued like SQL: comparing null yields unknown,
//! `NOT unknown` stays unknown, and only a definite true selects a row.

use std::collections::BTreeMap;

use crate::compiler::{CompareOp, Predicate};
use crate::planner::ColumnRef;
use crate::value::{Row, Value};

/// Rows of one expanded root row, by alias
pub type Tuple<'a> = BTreeMap<&'a str, &'a Row>;

static NULL: Value = Value::Null;

/// Reads a scoped column from a tuple
pub fn cell<'a>(tuple: &Tuple<'a>, column: &ColumnRef) -> &'a Value {
    tuple
        .get(column.alias.as_str())
        .copied()
        .and_then(|row| row.get(&column.column))
        .unwrap_or(&NULL)
}

/// Evaluates predicates against tuples
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a tuple satisfies all predicates
    pub fn matches(tuple: &Tuple<'_>, predicates: &[Predicate]) -> bool {
        predicates
            .iter()
            .all(|pred| Self::evaluate(tuple, pred) == Some(true))
    }

    /// `None` is SQL's unknown
    pub fn evaluate(tuple: &Tuple<'_>, predicate: &Predicate) -> Option<bool> {
        match predicate {
            Predicate::Compare { column, op, value } => {
                Self::compare(cell(tuple, column), *op, value)
            }
            Predicate::IsNull { column } => Some(cell(tuple, column).is_null()),
            Predicate::Contains {
                column,
                needle,
                case_insensitive,
            } => {
                let actual = cell(tuple, column);
                if actual.is_null() {
                    return None;
                }
                let haystack = actual.to_string();
                if *case_insensitive {
                    Some(haystack.to_lowercase().contains(&needle.to_lowercase()))
                } else {
                    Some(haystack.contains(needle.as_str()))
                }
            }
            Predicate::InSet { column, values } => {
                let actual = cell(tuple, column);
                if actual.is_null() {
                    return None;
                }
                Some(values.iter().any(|v| actual.matches(v)))
            }
            Predicate::Or { operands } => {
                let mut unknown = false;
                for operand in operands {
                    match Self::evaluate(tuple, operand) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => unknown = true,
                    }
                }
                if unknown {
                    None
                } else {
                    Some(false)
                }
            }
            Predicate::Not { operand } => Self::evaluate(tuple, operand).map(|b| !b),
        }
    }

    fn compare(actual: &Value, op: CompareOp, expected: &Value) -> Option<bool> {
        if actual.is_null() || expected.is_null() {
            return None;
        }

        let ordering = actual.compare(expected)?;
        Some(match op {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Ne => ordering.is_ne(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Gte => ordering.is_ge(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Lte => ordering.is_le(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Scope;

    fn column(alias: &str, name: &str) -> ColumnRef {
        ColumnRef {
            scope: Scope::Root,
            alias: alias.into(),
            column: name.into(),
        }
    }

    fn person(age: Option<i64>, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("age".into(), age.map_or(Value::Null, Value::Integer));
        row.insert("name".into(), Value::String(name.into()));
        row
    }

    #[test]
    fn test_compare_ops() {
        let row = person(Some(10), "John");
        let tuple: Tuple = [("person", &row)].into_iter().collect();
        let age = column("person", "age");

        let gte = Predicate::compare(age.clone(), CompareOp::Gte, Value::Integer(10));
        let gt = Predicate::compare(age, CompareOp::Gt, Value::Integer(10));
        assert!(PredicateFilter::matches(&tuple, &[gte.clone()]));
        assert!(!PredicateFilter::matches(&tuple, &[gt]));
        assert!(PredicateFilter::matches(&tuple, &[gte.clone(), gte]));
    }

    #[test]
    fn test_ilike_case_insensitive() {
        let row = person(Some(10), "John");
        let tuple: Tuple = [("person", &row)].into_iter().collect();
        let name = column("person", "name");

        let ilike = Predicate::Contains {
            column: name.clone(),
            needle: "oH".into(),
            case_insensitive: true,
        };
        let like = Predicate::Contains {
            column: name,
            needle: "oH".into(),
            case_insensitive: false,
        };
        assert!(PredicateFilter::matches(&tuple, &[ilike]));
        assert!(!PredicateFilter::matches(&tuple, &[like]));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let row = person(None, "a.c");
        let other = person(None, "abc");
        let needle = Predicate::Contains {
            column: column("person", "name"),
            needle: ".".into(),
            case_insensitive: true,
        };

        let tuple: Tuple = [("person", &row)].into_iter().collect();
        assert!(PredicateFilter::matches(&tuple, &[needle.clone()]));
        let tuple: Tuple = [("person", &other)].into_iter().collect();
        assert!(!PredicateFilter::matches(&tuple, &[needle]));
    }

    #[test]
    fn test_ilike_long_needle() {
        let needle = "Ab".repeat(200_000);
        let row = person(None, &format!("x{}x", needle.to_uppercase()));
        let tuple: Tuple = [("person", &row)].into_iter().collect();

        let ilike = Predicate::Contains {
            column: column("person", "name"),
            needle,
            case_insensitive: true,
        };
        assert_eq!(PredicateFilter::evaluate(&tuple, &ilike), Some(true));
    }

    #[test]
    fn test_null_is_unknown_under_not() {
        let row = person(None, "John");
        let tuple: Tuple = [("person", &row)].into_iter().collect();
        let age = column("person", "age");

        let not_gt =
            Predicate::not(Predicate::compare(age.clone(), CompareOp::Gt, Value::Integer(1)));
        assert_eq!(PredicateFilter::evaluate(&tuple, &not_gt), None);
        assert!(!PredicateFilter::matches(&tuple, &[not_gt]));

        let is_null = Predicate::IsNull { column: age };
        assert!(PredicateFilter::matches(&tuple, &[is_null]));
    }

    #[test]
    fn test_missing_alias_reads_null() {
        let row = person(Some(1), "John");
        let tuple: Tuple = [("person", &row)].into_iter().collect();

        let school = Predicate::IsNull {
            column: column("school", "id"),
        };
        assert!(PredicateFilter::matches(&tuple, &[school]));
    }

    #[test]
    fn test_in_set_and_or() {
        let row = person(Some(5), "John");
        let tuple: Tuple = [("person", &row)].into_iter().collect();
        let age = column("person", "age");

        let in_set = Predicate::InSet {
            column: age.clone(),
            values: vec![Value::Integer(1), Value::Integer(5)],
        };
        assert!(PredicateFilter::matches(&tuple, &[in_set]));

        let either = Predicate::any(vec![
            Predicate::compare(age.clone(), CompareOp::Eq, Value::Integer(1)),
            Predicate::compare(age, CompareOp::Eq, Value::Integer(5)),
        ]);
        assert!(PredicateFilter::matches(&tuple, &[either]));
    }
}
