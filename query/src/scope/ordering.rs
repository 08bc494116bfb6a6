//! Ordering specifications
//!
//! An ordering is a list of `(column, direction)` terms. Columns may be
//! table-qualified (`receive_orders.id`); unqualified columns belong to the
//! scope's own table. The text form mirrors a SQL `ORDER BY` list:
//!
//! ```
//! use index_query::scope::OrderingSpec;
//!
//! let spec: OrderingSpec = "expected_delivery_at DESC, receive_orders.id".parse().unwrap();
//! assert_eq!(spec.terms().len(), 2);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::utils::sql::is_identifier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn is_desc(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub table: Option<String>,
    pub field: String,
    pub direction: Direction,
}

impl OrderTerm {
    /// Table the term sorts on, defaulting to the scope's own table
    pub fn table_or<'a>(&'a self, base: &'a str) -> &'a str {
        self.table.as_deref().unwrap_or(base)
    }
}

impl fmt::Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{} {}", table, self.field, self.direction),
            None => write!(f, "{} {}", self.field, self.direction),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingSpec {
    terms: Vec<OrderTerm>,
}

impl OrderingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a term. `column` is `field` or `table.field`.
    pub fn then(mut self, column: &str, direction: Direction) -> Self {
        let (table, field) = match column.split_once('.') {
            Some((table, field)) => (Some(table.to_string()), field.to_string()),
            None => (None, column.to_string()),
        };
        self.terms.push(OrderTerm {
            table,
            field,
            direction,
        });
        self
    }

    pub fn asc(self, column: &str) -> Self {
        self.then(column, Direction::Asc)
    }

    pub fn desc(self, column: &str) -> Self {
        self.then(column, Direction::Desc)
    }

    pub fn terms(&self) -> &[OrderTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromStr for OrderingSpec {
    type Err = QueryError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut spec = OrderingSpec::new();
        for term in text.split(',') {
            let mut tokens = term.split_whitespace();
            let Some(column) = tokens.next() else {
                return Err(QueryError::invalid_ordering(format!(
                    "empty term in '{}'",
                    text
                )));
            };
            let direction = match tokens.next() {
                None => Direction::Asc,
                Some(token) if token.eq_ignore_ascii_case("asc") => Direction::Asc,
                Some(token) if token.eq_ignore_ascii_case("desc") => Direction::Desc,
                Some(token) => {
                    return Err(QueryError::invalid_ordering(format!(
                        "unknown direction '{}'",
                        token
                    )));
                }
            };
            if let Some(extra) = tokens.next() {
                return Err(QueryError::invalid_ordering(format!(
                    "unexpected '{}' after direction",
                    extra
                )));
            }
            let valid = match column.split_once('.') {
                Some((table, field)) => is_identifier(table) && is_identifier(field),
                None => is_identifier(column),
            };
            if !valid {
                return Err(QueryError::invalid_ordering(format!(
                    "invalid column '{}'",
                    column
                )));
            }
            spec = spec.then(column, direction);
        }
        Ok(spec)
    }
}

impl fmt::Display for OrderingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.terms.iter().map(OrderTerm::to_string).collect();
        write!(f, "{}", rendered.join(", "))
    }
}
