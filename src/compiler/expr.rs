//! Predicate expressions handed to the data layer

use std::fmt;

use serde::Serialize;

use crate::planner::ColumnRef;
use crate::value::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// A boolean expression over scoped columns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Compare {
        column: ColumnRef,
        op: CompareOp,
        value: Value,
    },
    IsNull {
        column: ColumnRef,
    },
    /// Substring match
    Contains {
        column: ColumnRef,
        needle: String,
        case_insensitive: bool,
    },
    InSet {
        column: ColumnRef,
        values: Vec<Value>,
    },
    Or {
        operands: Vec<Predicate>,
    },
    Not {
        operand: Box<Predicate>,
    },
}

impl Predicate {
    pub fn compare(column: ColumnRef, op: CompareOp, value: Value) -> Self {
        Predicate::Compare { column, op, value }
    }

    /// OR of the operands; a single operand stands alone
    pub fn any(mut operands: Vec<Predicate>) -> Self {
        if operands.len() == 1 {
            if let Some(only) = operands.pop() {
                return only;
            }
        }
        Predicate::Or { operands }
    }

    pub fn not(operand: Predicate) -> Self {
        Predicate::Not {
            operand: Box::new(operand),
        }
    }

    /// Every column the predicate reads
    pub fn columns(&self) -> Vec<&ColumnRef> {
        match self {
            Predicate::Compare { column, .. }
            | Predicate::IsNull { column }
            | Predicate::Contains { column, .. }
            | Predicate::InSet { column, .. } => vec![column],
            Predicate::Or { operands } => operands.iter().flat_map(Predicate::columns).collect(),
            Predicate::Not { operand } => operand.columns(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { column, op, value } => match value {
                Value::Null => write!(f, "{} {} NULL", column, op.as_str()),
                Value::String(_) | Value::Date(_) | Value::DateTime(_) | Value::Uuid(_) => {
                    write!(f, "{} {} '{}'", column, op.as_str(), value)
                }
                _ => write!(f, "{} {} {}", column, op.as_str(), value),
            },
            Predicate::IsNull { column } => write!(f, "{} IS NULL", column),
            Predicate::Contains {
                column,
                needle,
                case_insensitive,
            } => {
                let keyword = if *case_insensitive { "ILIKE" } else { "LIKE" };
                write!(f, "{} {} '%{}%'", column, keyword, needle)
            }
            Predicate::InSet { column, values } => {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} IN ({})", column, list.join(", "))
            }
            Predicate::Or { operands } => {
                let parts: Vec<String> = operands.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", parts.join(" OR "))
            }
            Predicate::Not { operand } => write!(f, "NOT ({})", operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Scope;

    fn age() -> ColumnRef {
        ColumnRef {
            scope: Scope::Root,
            alias: "person".into(),
            column: "age".into(),
        }
    }

    #[test]
    fn test_any_collapses_single_operand() {
        let p = Predicate::any(vec![Predicate::compare(age(), CompareOp::Gt, Value::Integer(1))]);
        assert!(matches!(p, Predicate::Compare { .. }));
    }

    #[test]
    fn test_columns_through_nesting() {
        let name = ColumnRef {
            scope: Scope::Join(0),
            alias: "student".into(),
            column: "name".into(),
        };
        let p = Predicate::not(Predicate::any(vec![
            Predicate::compare(age(), CompareOp::Eq, Value::Integer(1)),
            Predicate::IsNull { column: name.clone() },
        ]));
        assert_eq!(p.columns(), vec![&age(), &name]);
    }

    #[test]
    fn test_display() {
        let p = Predicate::not(Predicate::any(vec![
            Predicate::compare(age(), CompareOp::Eq, Value::Integer(1)),
            Predicate::IsNull { column: age() },
        ]));
        assert_eq!(p.to_string(), "NOT ((person.age = 1 OR person.age IS NULL))");
    }
}
