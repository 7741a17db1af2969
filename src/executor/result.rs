//! Result types for query execution

use crate::value::{Row, Value};

/// One materialized row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Model the row was read from
    pub model: String,
    /// Primary key value
    pub id: Value,
    /// Discriminator value for polymorphic models
    pub runtime_type: Option<String>,
    pub row: Row,
}

impl Record {
    pub fn id(&self) -> &Value {
        &self.id
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.row.get(column)
    }
}

/// Included rows sharing one schema and runtime type
#[derive(Debug, Clone, PartialEq)]
pub struct IncludedGroup {
    /// Schema of the include segment the rows were reached through
    pub schema: String,
    pub runtime_type: Option<String>,
    /// Deduplicated by primary key, in discovery order
    pub records: Vec<Record>,
}

/// Result of query execution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryOutput {
    /// Matching root rows before the window was applied
    pub total: u64,
    /// Root rows in result order
    pub records: Vec<Record>,
    pub included: Vec<IncludedGroup>,
}

impl QueryOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Included records across every group
    pub fn included_records(&self) -> impl Iterator<Item = &Record> {
        self.included.iter().flat_map(|g| g.records.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_empty() {
        let output = QueryOutput::empty();
        assert!(output.is_empty());
        assert_eq!(output.len(), 0);
        assert_eq!(output.total, 0);
        assert_eq!(output.included_records().count(), 0);
    }
}
