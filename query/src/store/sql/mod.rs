//! SQL backing store
//!
//! [`SqlScope`] collects the same joins, conditions and orderings as any
//! other scope and renders them as one parameterized `SELECT` for the chosen
//! [`Backend`]. Execution goes through `sqlx` against a SQLite pool; the
//! PostgreSQL dialect only renders.
//!
//! Every table, alias and field name is checked with
//! [`is_identifier`](crate::utils::sql::is_identifier) before it is spliced
//! into SQL. Values are always bound.

mod dialect;
mod postgres_dialect;
mod sqlite_dialect;

pub use dialect::SqlDialect;
pub use postgres_dialect::PostgresDialect;
pub use sqlite_dialect::SqliteDialect;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column as _, Row, SqlitePool, TypeInfo, ValueRef};

use super::catalog::Catalog;
use super::plan::{PlannedJoin, plan_joins};
use super::record::Record;
use crate::constants::{PRIMARY_KEY, SQL_PARENT_ID_ALIAS};
use crate::error::StoreError;
use crate::scope::{Column, Condition, EagerLoad, Family, JoinDescriptor, OrderingSpec, Scope};
use crate::utils::inflect::pluralize;
use crate::utils::sql::{escape_like_pattern, is_identifier};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Database backend identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Postgres,
}

impl Backend {
    /// Get the SQL dialect for this backend
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Backend::Sqlite => &SqliteDialect,
            Backend::Postgres => &PostgresDialect,
        }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        self.dialect().name()
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rendered statement with its bound parameters, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct SqlScope {
    catalog: Arc<Catalog>,
    table: String,
    entity: String,
    backend: Backend,
    joins: Vec<JoinDescriptor>,
    eager: Option<String>,
    conditions: Vec<Condition>,
    orderings: Vec<OrderingSpec>,
}

impl SqlScope {
    pub fn new(catalog: Arc<Catalog>, table: &str, backend: Backend) -> Result<Self, StoreError> {
        ensure_identifier(table)?;
        let entity = catalog.entity(table)?.to_string();
        Ok(Self {
            catalog,
            table: table.to_string(),
            entity,
            backend,
            joins: Vec::new(),
            eager: None,
            conditions: Vec::new(),
            orderings: Vec::new(),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Joins as they will be rendered, one per distinct hop chain
    pub fn join_plan(&self) -> Result<Vec<PlannedJoin>, StoreError> {
        plan_joins(
            &self.catalog,
            &self.table,
            &self.joins,
            self.eager.as_deref(),
        )
    }

    /// Render the scope for its own backend
    pub fn to_sql(&self) -> Result<SqlQuery, StoreError> {
        let select = format!("{}.*", self.table);
        self.render(self.backend, &select, self.eager.as_deref(), None)
    }

    /// Distinct base records in result order
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<Record>, StoreError> {
        let select = format!("{}.*", self.table);
        let query = self.render(Backend::Sqlite, &select, self.eager.as_deref(), None)?;
        tracing::debug!(sql = %query.sql, params = query.params.len(), "Executing scope");

        let rows = bind_all(sqlx::query(&query.sql), &query.params)
            .fetch_all(pool)
            .await?;

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for row in &rows {
            let record = Record::new(decode_row(row)?);
            if let Some(key) = record.id_key()
                && seen.insert(key)
            {
                records.push(record);
            }
        }
        tracing::debug!(
            table = %self.table,
            rows = rows.len(),
            records = records.len(),
            "Fetched scope"
        );
        Ok(records)
    }

    /// Distinct parents in result order, each with the `relation` children
    /// loaded through the same joins and conditions
    pub async fn fetch_families(
        &self,
        pool: &SqlitePool,
        relation: &str,
    ) -> Result<Vec<Family<Record>>, StoreError> {
        let parents = self.clone().eager_load(relation).fetch_all(pool).await?;

        let alias = pluralize(relation);
        ensure_identifier(&alias)?;
        let select = format!(
            "{}.*, {}.{} AS {}",
            alias, self.table, PRIMARY_KEY, SQL_PARENT_ID_ALIAS
        );
        // children of one parent come back in key order after any declared ordering
        let child_key = Column::new(alias.as_str(), PRIMARY_KEY);
        let query = self.render(Backend::Sqlite, &select, Some(relation), Some(&child_key))?;
        tracing::debug!(sql = %query.sql, relation, "Fetching families");

        let rows = bind_all(sqlx::query(&query.sql), &query.params)
            .fetch_all(pool)
            .await?;

        let family_index: HashMap<String, usize> = parents
            .iter()
            .enumerate()
            .filter_map(|(index, parent)| parent.id_key().map(|key| (key, index)))
            .collect();
        let mut families: Vec<Family<Record>> = parents
            .into_iter()
            .map(|parent| Family::new(parent, Vec::new()))
            .collect();

        let mut seen_children = HashSet::new();
        for row in &rows {
            let mut fields = decode_row(row)?;
            let parent_key = fields
                .remove(SQL_PARENT_ID_ALIAS)
                .filter(|id| !id.is_null())
                .map(|id| id.to_string());
            let child = Record::new(fields);

            if let Some(parent_key) = parent_key
                && let Some(&index) = family_index.get(&parent_key)
                && let Some(child_key) = child.id_key()
                && seen_children.insert((index, child_key))
            {
                families[index].children.push(child);
            }
        }
        Ok(families)
    }

    fn render(
        &self,
        backend: Backend,
        select: &str,
        eager: Option<&str>,
        tiebreak: Option<&Column>,
    ) -> Result<SqlQuery, StoreError> {
        let dialect = backend.dialect();
        let mut sql = format!("SELECT {} FROM {}", select, self.table);

        for join in plan_joins(&self.catalog, &self.table, &self.joins, eager)? {
            ensure_identifier(&join.table)?;
            let (target, owner) = join
                .association
                .join_columns(&join.owner_alias, &join.alias);
            ensure_column(&target)?;
            ensure_column(&owner)?;

            let joined = if join.alias == join.table {
                join.table.clone()
            } else {
                format!("{} AS {}", join.table, join.alias)
            };
            sql.push_str(&format!(
                " {} {} ON {} = {}",
                join.kind.sql(),
                joined,
                target,
                owner
            ));
        }

        let mut params = Vec::new();
        let clauses = self
            .conditions
            .iter()
            .map(|condition| render_condition(dialect, condition, &mut params))
            .collect::<Result<Vec<_>, _>>()?;
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut terms = Vec::new();
        for term in self.orderings.iter().flat_map(OrderingSpec::terms) {
            let column = Column::new(term.table_or(&self.table), term.field.as_str());
            ensure_column(&column)?;
            terms.push(dialect.order_term(&column.qualified(), term.direction.is_desc()));
        }
        if let Some(column) = tiebreak {
            ensure_column(column)?;
            terms.push(dialect.order_term(&column.qualified(), false));
        }
        if !terms.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        Ok(SqlQuery { sql, params })
    }
}

fn ensure_identifier(name: &str) -> Result<(), StoreError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

fn ensure_column(column: &Column) -> Result<(), StoreError> {
    ensure_identifier(&column.table)?;
    ensure_identifier(&column.field)
}

fn render_condition(
    dialect: &dyn SqlDialect,
    condition: &Condition,
    params: &mut Vec<Value>,
) -> Result<String, StoreError> {
    let column = condition.column();
    ensure_column(column)?;
    let col = column.qualified();

    let clause = match condition {
        Condition::Compare {
            comparison, value, ..
        } => {
            params.push(value.clone());
            format!(
                "{} {} {}",
                col,
                comparison.sql_operator(),
                dialect.placeholder(params.len())
            )
        }
        // IN () is not valid SQL and would match nothing anyway
        Condition::AnyOf { values, .. } if values.is_empty() => "1 = 0".to_string(),
        Condition::AnyOf { values, .. } => {
            let placeholders: Vec<String> = values
                .iter()
                .map(|value| {
                    params.push(value.clone());
                    dialect.placeholder(params.len())
                })
                .collect();
            format!("{} IN ({})", col, placeholders.join(", "))
        }
        Condition::Contains { needle, .. } => {
            params.push(Value::String(format!("%{}%", escape_like_pattern(needle))));
            dialect.contains(&col, params.len())
        }
        Condition::IsNull { .. } => format!("{} IS NULL", col),
        Condition::IsNotNull { .. } => format!("{} IS NOT NULL", col),
    };
    Ok(clause)
}

fn bind_all<'q>(query: SqliteQuery<'q>, params: &[Value]) -> SqliteQuery<'q> {
    params.iter().fold(query, bind_value)
}

fn bind_value<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// Decode a row into a JSON object keyed by column name
///
/// Uses the storage class of each value, so an INTEGER column holding text
/// still decodes as text. BLOBs become arrays of byte values.
fn decode_row(row: &SqliteRow) -> Result<Map<String, Value>, StoreError> {
    let mut fields = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" | "NUMERIC" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
                "BOOLEAN" => Value::from(row.try_get_unchecked::<bool, _>(index)?),
                "BLOB" => Value::from(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
            }
        };
        fields.insert(column.name().to_string(), value);
    }
    Ok(fields)
}

impl Scope for SqlScope {
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

impl EagerLoad for SqlScope {
    fn entity_name(&self) -> &str {
        &self.entity
    }

    fn eager_load(mut self, relation: &str) -> Self {
        self.eager = Some(relation.to_string());
        self
    }
}
