//! In-memory backing store
//!
//! Holds JSON records per table and evaluates scopes by expanding planned
//! joins into rows of `alias -> record`, filtering, then sorting. Joined rows
//! collapse back to distinct base records in result order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;

use super::catalog::{Association, Catalog};
use super::plan::{JoinKind, PlannedJoin, plan_joins};
use super::record::Record;
use crate::constants::PRIMARY_KEY;
use crate::error::StoreError;
use crate::scope::{
    Column, Condition, Direction, EagerLoad, Family, JoinDescriptor, LoadFamilies, OrderingSpec,
    Scope, compare_values, value_text,
};
use crate::utils::inflect::pluralize;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    catalog: Catalog,
    tables: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        let tables = catalog
            .tables()
            .map(|table| (table.to_string(), Vec::new()))
            .collect();
        Self { catalog, tables }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Insert a JSON object into a catalogued table
    pub fn insert(&mut self, table: &str, record: Value) -> Result<(), StoreError> {
        let rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::unknown_table(table))?;
        let Value::Object(fields) = record else {
            return Err(StoreError::NotAnObject {
                table: table.to_string(),
            });
        };
        let record = Record::new(fields);
        if record.id_key().is_none() {
            return Err(StoreError::MissingId {
                table: table.to_string(),
            });
        }
        rows.push(record);
        Ok(())
    }

    /// Insert every object of a JSON array
    pub fn insert_all(&mut self, table: &str, records: Value) -> Result<(), StoreError> {
        let Value::Array(records) = records else {
            return self.insert(table, records);
        };
        for record in records {
            self.insert(table, record)?;
        }
        Ok(())
    }

    /// Unfiltered scope over `table`
    pub fn scope(&self, table: &str) -> Result<MemoryScope<'_>, StoreError> {
        let entity = self.catalog.entity(table)?;
        Ok(MemoryScope {
            store: self,
            table: table.to_string(),
            entity: entity.to_string(),
            joins: Vec::new(),
            eager: None,
            conditions: Vec::new(),
            orderings: Vec::new(),
        })
    }

    fn rows_of(&self, table: &str) -> Result<&[Record], StoreError> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::unknown_table(table))
    }
}

/// One joined row: the record bound to each alias, `None` after a left join
/// that found nothing
type Row<'a> = BTreeMap<String, Option<&'a Record>>;

#[derive(Debug, Clone)]
pub struct MemoryScope<'a> {
    store: &'a MemoryStore,
    table: String,
    entity: String,
    joins: Vec<JoinDescriptor>,
    eager: Option<String>,
    conditions: Vec<Condition>,
    orderings: Vec<OrderingSpec>,
}

impl<'a> MemoryScope<'a> {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Join descriptors in the order they were applied, repeats included
    pub fn join_descriptors(&self) -> &[JoinDescriptor] {
        &self.joins
    }

    pub fn orderings(&self) -> &[OrderingSpec] {
        &self.orderings
    }

    /// Joins as they will be executed, one per distinct hop chain
    pub fn join_plan(&self) -> Result<Vec<PlannedJoin>, StoreError> {
        plan_joins(
            &self.store.catalog,
            &self.table,
            &self.joins,
            self.eager.as_deref(),
        )
    }

    /// Distinct base records in result order
    pub fn records(&self) -> Result<Vec<Record>, StoreError> {
        let rows = self.rows(self.eager.as_deref(), None)?;
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for row in &rows {
            if let Some(record) = bound(row, &self.table)
                && let Some(key) = record.id_key()
                && seen.insert(key)
            {
                records.push(record.clone());
            }
        }
        tracing::debug!(
            table = %self.table,
            rows = rows.len(),
            records = records.len(),
            "Materialized memory scope"
        );
        Ok(records)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records()?.len())
    }

    /// Joined, filtered and sorted rows; `tiebreak` sorts last, ascending
    fn rows(
        &self,
        eager: Option<&str>,
        tiebreak: Option<&Column>,
    ) -> Result<Vec<Row<'a>>, StoreError> {
        let store = self.store;
        let mut rows: Vec<Row<'a>> = store
            .rows_of(&self.table)?
            .iter()
            .map(|record| Row::from([(self.table.clone(), Some(record))]))
            .collect();

        for join in plan_joins(&store.catalog, &self.table, &self.joins, eager)? {
            rows = expand(rows, &join, store.rows_of(&join.table)?);
        }

        rows.retain(|row| self.conditions.iter().all(|c| evaluate(c, row)));

        let mut keys: Vec<(Column, Direction)> = self
            .orderings
            .iter()
            .flat_map(OrderingSpec::terms)
            .map(|term| {
                (
                    Column::new(term.table_or(&self.table), term.field.as_str()),
                    term.direction,
                )
            })
            .collect();
        if let Some(column) = tiebreak {
            keys.push((column.clone(), Direction::Asc));
        }
        if !keys.is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, &keys));
        }
        Ok(rows)
    }
}

fn bound<'a>(row: &Row<'a>, alias: &str) -> Option<&'a Record> {
    row.get(alias).copied().flatten()
}

/// Non-null value of a column in a row; a missing alias or field reads as null
fn column_value<'a>(row: &Row<'a>, column: &Column) -> Option<&'a Value> {
    bound(row, &column.table)?
        .get(&column.field)
        .filter(|value| !value.is_null())
}

fn links(association: &Association, owner: &Record, target: &Record) -> bool {
    let (target_field, owner_field) = association.key_fields();
    match (target.get(target_field), owner.get(owner_field)) {
        (Some(a), Some(b)) => compare_values(a, b) == Some(Ordering::Equal),
        _ => false,
    }
}

fn expand<'a>(rows: Vec<Row<'a>>, join: &PlannedJoin, targets: &'a [Record]) -> Vec<Row<'a>> {
    let mut expanded = Vec::with_capacity(rows.len());
    for row in rows {
        let matches: Vec<&'a Record> = match bound(&row, &join.owner_alias) {
            Some(owner) => targets
                .iter()
                .filter(|target| links(&join.association, owner, target))
                .collect(),
            None => Vec::new(),
        };

        if matches.is_empty() {
            if join.kind == JoinKind::Left {
                let mut row = row;
                row.insert(join.alias.clone(), None);
                expanded.push(row);
            }
            continue;
        }

        for target in matches {
            let mut joined = row.clone();
            joined.insert(join.alias.clone(), Some(target));
            expanded.push(joined);
        }
    }
    expanded
}

fn evaluate(condition: &Condition, row: &Row<'_>) -> bool {
    let actual = column_value(row, condition.column());
    match condition {
        Condition::Compare {
            comparison, value, ..
        } => actual
            .and_then(|actual| compare_values(actual, value))
            .is_some_and(|ordering| comparison.holds(ordering)),
        Condition::AnyOf { values, .. } => actual.is_some_and(|actual| {
            values
                .iter()
                .any(|value| compare_values(actual, value) == Some(Ordering::Equal))
        }),
        Condition::Contains { needle, .. } => actual.is_some_and(|actual| {
            value_text(actual)
                .to_lowercase()
                .contains(&needle.to_lowercase())
        }),
        Condition::IsNull { .. } => actual.is_none(),
        Condition::IsNotNull { .. } => actual.is_some(),
    }
}

/// Sort rank of a non-null value: numbers and booleans, then strings, then
/// arrays and objects
fn sort_rank(value: &Value) -> u8 {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Array(_) => 2,
        Value::Object(_) => 3,
    }
}

fn sort_number(value: &Value) -> f64 {
    match value {
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Number(number) => number.as_f64().unwrap_or_default(),
        _ => 0.0,
    }
}

/// Total order over non-null values, so mixed-type columns still sort
fn compare_sort_values(left: &Value, right: &Value) -> Ordering {
    sort_rank(left)
        .cmp(&sort_rank(right))
        .then_with(|| match (left, right) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(_) | Value::Object(_), _) => left.to_string().cmp(&right.to_string()),
            _ => sort_number(left).total_cmp(&sort_number(right)),
        })
}

/// Nulls sort first ascending, last descending
fn compare_rows(a: &Row<'_>, b: &Row<'_>, keys: &[(Column, Direction)]) -> Ordering {
    for (column, direction) in keys {
        let ordering = match (column_value(a, column), column_value(b, column)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left), Some(right)) => compare_sort_values(left, right),
        };
        let ordering = if direction.is_desc() {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl Scope for MemoryScope<'_> {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    fn joins(mut self, descriptor: &JoinDescriptor) -> Self {
        self.joins.push(descriptor.clone());
        self
    }

    fn order(mut self, ordering: &OrderingSpec) -> Self {
        self.orderings.push(ordering.clone());
        self
    }
}

impl EagerLoad for MemoryScope<'_> {
    fn entity_name(&self) -> &str {
        &self.entity
    }

    fn eager_load(mut self, relation: &str) -> Self {
        self.eager = Some(relation.to_string());
        self
    }
}

impl LoadFamilies for MemoryScope<'_> {
    type Record = Record;

    fn families(&self, relation: &str) -> Result<Vec<Family<Record>>, StoreError> {
        let alias = pluralize(relation);

        // parents keep the scope's own order
        let mut families: Vec<Family<Record>> = Vec::new();
        let mut family_index: HashMap<String, usize> = HashMap::new();
        for row in &self.rows(Some(relation), None)? {
            if let Some(parent) = bound(row, &self.table)
                && let Some(parent_key) = parent.id_key()
            {
                family_index.entry(parent_key).or_insert_with(|| {
                    families.push(Family::new(parent.clone(), Vec::new()));
                    families.len() - 1
                });
            }
        }

        // children of one parent come back in key order after any declared ordering
        let child_id = Column::new(alias.as_str(), PRIMARY_KEY);
        let mut seen_children: HashSet<(usize, String)> = HashSet::new();
        for row in &self.rows(Some(relation), Some(&child_id))? {
            if let Some(parent) = bound(row, &self.table)
                && let Some(parent_key) = parent.id_key()
                && let Some(&index) = family_index.get(&parent_key)
                && let Some(child) = bound(row, &alias)
                && let Some(child_key) = child.id_key()
                && seen_children.insert((index, child_key))
            {
                families[index].children.push(child.clone());
            }
        }

        tracing::debug!(
            table = %self.table,
            relation,
            families = families.len(),
            "Loaded families"
        );
        Ok(families)
    }
}
