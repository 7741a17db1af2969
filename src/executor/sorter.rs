//! Result sorting for query execution
//!
//! Sorts matched tuples by scoped columns, deterministically.

use std::cmp::Ordering;

use crate::planner::ColumnRef;
use crate::url::Direction;

use super::filters::{cell, Tuple};

/// Sorts matched tuples
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts tuples by each key in turn.
    ///
    /// Sort is stable: ties keep table order. Nulls sort first ascending and
    /// last descending.
    pub fn sort(tuples: &mut [Tuple<'_>], keys: &[(ColumnRef, Direction)]) {
        if keys.is_empty() {
            return;
        }

        tuples.sort_by(|a, b| {
            keys.iter()
                .map(|(column, direction)| {
                    let ordering = cell(a, column).sort_order(cell(b, column));
                    match direction {
                        Direction::Ascending => ordering,
                        Direction::Descending => ordering.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Scope;
    use crate::value::{Row, Value};

    fn row(id: i64, age: Option<i64>, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), Value::Integer(id));
        row.insert("age".into(), age.map_or(Value::Null, Value::Integer));
        row.insert("name".into(), Value::String(name.into()));
        row
    }

    fn key(column: &str, direction: Direction) -> (ColumnRef, Direction) {
        (
            ColumnRef {
                scope: Scope::Root,
                alias: "person".into(),
                column: column.into(),
            },
            direction,
        )
    }

    fn ids(tuples: &[Tuple<'_>]) -> Vec<i64> {
        tuples
            .iter()
            .map(|t| match t["person"].get("id") {
                Some(Value::Integer(id)) => *id,
                _ => -1,
            })
            .collect()
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let rows = vec![row(1, Some(30), "c"), row(2, Some(20), "a"), row(3, Some(25), "b")];
        let mut tuples: Vec<Tuple> = rows.iter().map(|r| [("person", r)].into()).collect();

        ResultSorter::sort(&mut tuples, &[key("age", Direction::Ascending)]);
        assert_eq!(ids(&tuples), vec![2, 3, 1]);

        ResultSorter::sort(&mut tuples, &[key("age", Direction::Descending)]);
        assert_eq!(ids(&tuples), vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_stable_with_secondary_key() {
        let rows = vec![row(1, Some(25), "b"), row(2, Some(25), "a"), row(3, Some(20), "z")];
        let mut tuples: Vec<Tuple> = rows.iter().map(|r| [("person", r)].into()).collect();

        ResultSorter::sort(&mut tuples, &[key("age", Direction::Ascending)]);
        assert_eq!(ids(&tuples), vec![3, 1, 2]);

        ResultSorter::sort(
            &mut tuples,
            &[key("age", Direction::Ascending), key("name", Direction::Ascending)],
        );
        assert_eq!(ids(&tuples), vec![3, 2, 1]);
    }

    #[test]
    fn test_nulls_first_ascending() {
        let rows = vec![row(1, Some(5), "a"), row(2, None, "b")];
        let mut tuples: Vec<Tuple> = rows.iter().map(|r| [("person", r)].into()).collect();

        ResultSorter::sort(&mut tuples, &[key("age", Direction::Ascending)]);
        assert_eq!(ids(&tuples), vec![2, 1]);

        ResultSorter::sort(&mut tuples, &[key("age", Direction::Descending)]);
        assert_eq!(ids(&tuples), vec![1, 2]);
    }
}
