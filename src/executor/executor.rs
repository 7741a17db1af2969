//! In-memory data layer
//!
//! Executes compiled queries against rows held per model, producing
//! deterministic results.
//!
//! Execution flow (strict order):
//! 1. Expand each root row along the joins that filters or sorts read into
//!    alias tuples (left outer)
//! 2. Keep the root row if any tuple satisfies every predicate
//! 3. Sort on the first matching tuple
//! 4. Count, then apply the window
//! 5. Collect included rows along each include chain for the kept rows

use std::collections::{BTreeMap, HashSet};

use crate::compiler::{Predicate, QueryBuilder, Window};
use crate::model::{JoinDescriptor, ModelDef, ModelLayer, ModelRegistry};
use crate::observability::{Event, Logger, MetricsRegistry, ObservationScope};
use crate::planner::{ColumnRef, IncludeClause, PlannedJoin, Scope};
use crate::url::Direction;
use crate::value::{Row, Value};

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::{PredicateFilter, Tuple};
use super::result::{IncludedGroup, QueryOutput, Record};
use super::sorter::ResultSorter;

/// A relational data layer the compiler can target
pub trait DataLayer {
    type Query: QueryBuilder;

    /// Start a query rooted at a model
    fn query(&self, root: &str) -> ExecutorResult<Self::Query>;

    fn execute(&self, query: &Self::Query) -> ExecutorResult<QueryOutput>;
}

/// Query under construction for [`MemoryDatabase`]
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    root: String,
    joins: Vec<PlannedJoin>,
    predicates: Vec<Predicate>,
    sorts: Vec<(ColumnRef, Direction)>,
    window: Option<Window>,
    includes: Vec<IncludeClause>,
}

impl MemoryQuery {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            joins: Vec::new(),
            predicates: Vec::new(),
            sorts: Vec::new(),
            window: None,
            includes: Vec::new(),
        }
    }

    /// Root model; also the root alias
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn joins(&self) -> &[PlannedJoin] {
        &self.joins
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    fn join(&self, id: usize) -> ExecutorResult<&PlannedJoin> {
        self.joins
            .iter()
            .find(|j| j.id == id)
            .ok_or_else(|| ExecutorError::invalid_plan(format!("Join {} was never applied", id)))
    }

    fn parent_alias(&self, join: &PlannedJoin) -> ExecutorResult<&str> {
        match join.parent {
            None => Ok(&self.root),
            Some(parent) => self.join(parent).map(|p| p.alias.as_str()),
        }
    }

    /// Joins read by a predicate or sort, with their ancestors.
    /// Include-only joins are walked separately after the window.
    fn filtering_joins(&self) -> ExecutorResult<HashSet<usize>> {
        let columns = self
            .predicates
            .iter()
            .flat_map(Predicate::columns)
            .chain(self.sorts.iter().map(|(column, _)| column));

        let mut needed = HashSet::new();
        for column in columns {
            let mut scope = column.scope;
            while let Scope::Join(id) = scope {
                if !needed.insert(id) {
                    break;
                }
                scope = self.join(id)?.parent_scope();
            }
        }
        Ok(needed)
    }
}

impl QueryBuilder for MemoryQuery {
    fn apply_join(&mut self, join: &PlannedJoin) {
        self.joins.push(join.clone());
    }

    fn apply_filter(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    fn apply_sort(&mut self, column: &ColumnRef, direction: Direction) {
        self.sorts.push((column.clone(), direction));
    }

    fn apply_window(&mut self, window: Window) {
        self.window = Some(window);
    }

    fn apply_include(&mut self, include: &IncludeClause) {
        self.includes.push(include.clone());
    }
}

/// Rows per model, typed by the model registry
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    models: ModelRegistry,
    tables: BTreeMap<String, Vec<Row>>,
}

impl MemoryDatabase {
    pub fn new(models: ModelRegistry) -> Self {
        let tables = models
            .models()
            .map(|m| (m.name.clone(), Vec::new()))
            .collect();
        Self { models, tables }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Rows of a model in insertion order
    pub fn rows(&self, model: &str) -> ExecutorResult<&[Row]> {
        self.tables
            .get(model)
            .map(Vec::as_slice)
            .ok_or_else(|| ExecutorError::unknown_model(model))
    }

    /// Append a typed row; columns it omits read as null
    pub fn insert(&mut self, model: &str, mut row: Row) -> ExecutorResult<()> {
        let def = self
            .models
            .model(model)
            .ok_or_else(|| ExecutorError::unknown_model(model))?;
        let table = self
            .tables
            .get_mut(model)
            .ok_or_else(|| ExecutorError::unknown_model(model))?;

        if let Some(column) = row.keys().find(|c| !def.columns.contains_key(*c)) {
            return Err(ExecutorError::invalid_row(
                model,
                table.len(),
                format!("unknown column '{}'", column),
            ));
        }
        for column in def.columns.keys() {
            row.entry(column.clone()).or_insert(Value::Null);
        }

        table.push(row);
        Ok(())
    }

    /// Decode JSON objects into rows of `model`
    pub fn load_rows(&mut self, model: &str, rows: &[serde_json::Value]) -> ExecutorResult<usize> {
        let def = self
            .models
            .model(model)
            .cloned()
            .ok_or_else(|| ExecutorError::unknown_model(model))?;
        let offset = self.rows(model)?.len();

        for (i, json) in rows.iter().enumerate() {
            let index = offset + i;
            let object = json
                .as_object()
                .ok_or_else(|| ExecutorError::invalid_row(model, index, "expected an object"))?;

            let mut row = Row::new();
            for (column, cell) in object {
                let value_type = def.columns.get(column).ok_or_else(|| {
                    ExecutorError::invalid_row(model, index, format!("unknown column '{}'", column))
                })?;
                let value = value_type.decode(cell).map_err(|e| {
                    ExecutorError::invalid_row(model, index, format!("column '{}': {}", column, e))
                })?;
                row.insert(column.clone(), value);
            }
            self.insert(model, row)?;
        }

        Ok(rows.len())
    }

    /// Load `{"<model>": [<row>, ...], ...}`
    pub fn load_dataset(&mut self, dataset: &serde_json::Value) -> ExecutorResult<usize> {
        let tables = dataset
            .as_object()
            .ok_or_else(|| ExecutorError::invalid_row("dataset", 0, "expected an object of tables"))?;

        let mut total = 0;
        for (model, rows) in tables {
            let rows = rows.as_array().ok_or_else(|| {
                ExecutorError::invalid_row(model.as_str(), 0, "expected an array of rows")
            })?;
            total += self.load_rows(model, rows)?;
        }

        Logger::info(
            Event::DatasetLoaded.as_str(),
            &[
                ("tables", &tables.len().to_string()),
                ("rows", &total.to_string()),
            ],
        );
        Ok(total)
    }

    fn model_def(&self, model: &str) -> ExecutorResult<&ModelDef> {
        self.models
            .model(model)
            .ok_or_else(|| ExecutorError::unknown_model(model))
    }

    /// Rows of the join target matching one source row
    fn related(&self, row: &Row, descriptor: &JoinDescriptor) -> ExecutorResult<Vec<&Row>> {
        let local = row.get(&descriptor.condition.local_column).unwrap_or(&Value::Null);
        if local.is_null() {
            return Ok(Vec::new());
        }

        Ok(self
            .rows(&descriptor.target)?
            .iter()
            .filter(|target| {
                target
                    .get(&descriptor.condition.remote_column)
                    .map_or(false, |remote| remote.matches(local))
            })
            .collect())
    }

    /// Left-outer expansion of one root row along the `needed` joins
    fn expand<'a>(
        &'a self,
        query: &'a MemoryQuery,
        needed: &HashSet<usize>,
        root: &'a Row,
    ) -> ExecutorResult<Vec<Tuple<'a>>> {
        let mut tuples: Vec<Tuple<'a>> = vec![[(query.root(), root)].into()];

        for join in query.joins.iter().filter(|j| needed.contains(&j.id)) {
            let parent = query.parent_alias(join)?;
            let mut next = Vec::with_capacity(tuples.len());

            for tuple in tuples {
                let matches = match tuple.get(parent) {
                    Some(row) => self.related(row, &join.descriptor)?,
                    None => Vec::new(),
                };

                if matches.is_empty() {
                    next.push(tuple);
                    continue;
                }
                for row in matches {
                    let mut extended = tuple.clone();
                    extended.insert(join.alias.as_str(), row);
                    next.push(extended);
                }
            }
            tuples = next;
        }

        Ok(tuples)
    }

    fn record(&self, model: &ModelDef, row: &Row) -> Record {
        let runtime_type = model
            .discriminator
            .as_ref()
            .and_then(|column| row.get(column))
            .and_then(Value::as_str)
            .map(str::to_string);

        Record {
            model: model.name.clone(),
            id: row.get(&model.primary_key).cloned().unwrap_or(Value::Null),
            runtime_type,
            row: row.clone(),
        }
    }

    /// Walk each include chain from the kept root rows
    fn collect_includes(
        &self,
        query: &MemoryQuery,
        roots: &[&Row],
    ) -> ExecutorResult<Vec<IncludedGroup>> {
        let mut groups: Vec<IncludedGroup> = Vec::new();
        let mut seen: HashSet<(String, Option<String>, String)> = HashSet::new();

        for include in &query.includes {
            let mut frontier: Vec<&Row> = roots.to_vec();

            for (depth, id) in include.joins.iter().enumerate() {
                let join = query.join(*id)?;
                let model = self.model_def(&join.descriptor.target)?;
                let schema = include.schemas.get(depth).ok_or_else(|| {
                    ExecutorError::invalid_plan(format!(
                        "Include '{}' has no schema for segment {}",
                        include.path.join("."),
                        depth
                    ))
                })?;

                let mut next: Vec<&Row> = Vec::new();
                for row in &frontier {
                    for related in self.related(row, &join.descriptor)? {
                        if next.iter().any(|r| std::ptr::eq(*r, related)) {
                            continue;
                        }
                        next.push(related);

                        let record = self.record(model, related);
                        let key = (schema.clone(), record.runtime_type.clone(), record.id.to_string());
                        if !seen.insert(key) {
                            continue;
                        }

                        match groups
                            .iter_mut()
                            .find(|g| g.schema == *schema && g.runtime_type == record.runtime_type)
                        {
                            Some(group) => group.records.push(record),
                            None => groups.push(IncludedGroup {
                                schema: schema.clone(),
                                runtime_type: record.runtime_type.clone(),
                                records: vec![record],
                            }),
                        }
                    }
                }
                frontier = next;
            }
        }

        Ok(groups)
    }
}

impl DataLayer for MemoryDatabase {
    type Query = MemoryQuery;

    fn query(&self, root: &str) -> ExecutorResult<MemoryQuery> {
        self.model_def(root)?;
        Ok(MemoryQuery::new(root))
    }

    /// Executes a query.
    ///
    /// This method is deterministic: same query + same rows = same output.
    fn execute(&self, query: &MemoryQuery) -> ExecutorResult<QueryOutput> {
        let scope = ObservationScope::with_fields("EXECUTE", &[("model", query.root())]);
        let model = self.model_def(query.root())?;

        let needed = query.filtering_joins()?;
        let mut matched: Vec<Tuple> = Vec::new();
        for row in self.rows(query.root())? {
            let tuples = self.expand(query, &needed, row)?;
            if let Some(tuple) = tuples
                .into_iter()
                .find(|t| PredicateFilter::matches(t, &query.predicates))
            {
                matched.push(tuple);
            }
        }

        ResultSorter::sort(&mut matched, &query.sorts);

        let total = matched.len() as u64;
        let (offset, limit) = match query.window {
            Some(window) => (
                usize::try_from(window.offset).unwrap_or(usize::MAX),
                usize::try_from(window.limit).unwrap_or(usize::MAX),
            ),
            None => (0, matched.len()),
        };

        let roots: Vec<&Row> = matched
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|t| t.get(query.root()).copied())
            .collect();

        let records: Vec<Record> = roots.iter().map(|row| self.record(model, row)).collect();
        let included = self.collect_includes(query, &roots)?;

        let metrics = MetricsRegistry::global();
        metrics.increment_queries_executed();
        metrics.add_rows_returned(records.len() as u64);

        let returned = records.len().to_string();
        Logger::trace(
            Event::QueryExecuted.as_str(),
            &[
                ("model", query.root()),
                ("total", &total.to_string()),
                ("returned", &returned),
            ],
        );
        scope.complete_with_fields(&[("returned", &returned)]);

        Ok(QueryOutput {
            total,
            records,
            included,
        })
    }
}
