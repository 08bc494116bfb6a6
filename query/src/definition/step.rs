//! Steps accumulated per filter name
//!
//! Steps are plain data. The builder interprets them against a scope, so a
//! definition can be inspected and compared in tests without running it.

use serde_json::Value;

use super::Operator;
use crate::scope::{Column, JoinDescriptor, Scope};
use crate::value::FilterName;

/// Table a predicate is resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    /// The scope's own table, looked up when the step is applied
    Base,
    /// A joined table
    Named(String),
}

impl TableRef {
    pub fn resolve<'a>(&'a self, base: &'a str) -> &'a str {
        match self {
            Self::Base => base,
            Self::Named(table) => table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Join required before a predicate can reference a related table
    Join { descriptor: JoinDescriptor },
    Predicate {
        table: TableRef,
        field: String,
        operator: Operator,
        filter: FilterName,
    },
}

impl Step {
    pub fn is_join(&self) -> bool {
        matches!(self, Self::Join { .. })
    }

    /// Fold this step onto a scope. Joins ignore the value.
    pub fn apply<S: Scope>(&self, scope: S, value: &Value) -> S {
        match self {
            Self::Join { descriptor } => scope.joins(descriptor),
            Self::Predicate {
                table,
                field,
                operator,
                ..
            } => {
                let column = Column::new(table.resolve(scope.table_name()), field.as_str());
                scope.filter(operator.condition(column, value))
            }
        }
    }
}
