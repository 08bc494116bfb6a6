//! Conditions a scope can be narrowed by
//!
//! These are the typed form of a SQL `WHERE` fragment: a qualified column,
//! what it is compared with, and the bound value. Stores decide how to
//! evaluate or render them.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

/// A table-qualified column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: String,
    pub field: String,
}

impl Column {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }

    /// `table.field`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.field)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

/// Binary comparison against a bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn sql_operator(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Whether `column_value.cmp(bound)` satisfies this comparison
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A conjunctive condition added to a scope
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> value`
    Compare {
        column: Column,
        comparison: Comparison,
        value: Value,
    },
    /// `column IN (values...)`
    AnyOf { column: Column, values: Vec<Value> },
    /// Case-insensitive substring match
    Contains { column: Column, needle: String },
    IsNull { column: Column },
    IsNotNull { column: Column },
}

impl Condition {
    pub fn column(&self) -> &Column {
        match self {
            Self::Compare { column, .. }
            | Self::AnyOf { column, .. }
            | Self::Contains { column, .. }
            | Self::IsNull { column }
            | Self::IsNotNull { column } => column,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare {
                column,
                comparison,
                value,
            } => write!(f, "{} {} {}", column, comparison.sql_operator(), value),
            Self::AnyOf { column, values } => {
                let rendered: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "{} IN ({})", column, rendered.join(", "))
            }
            Self::Contains { column, needle } => write!(f, "{} ILIKE '%{}%'", column, needle),
            Self::IsNull { column } => write!(f, "{} IS NULL", column),
            Self::IsNotNull { column } => write!(f, "{} IS NOT NULL", column),
        }
    }
}

/// Text form of a value as it would be interpolated into a pattern
///
/// Strings are used as-is, `null` is empty, everything else uses its JSON
/// rendering.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Compare two JSON scalars the way a SQL engine with loose typing would
///
/// Numbers compare numerically, strings lexically, booleans false < true.
/// A number and a numeric string compare as numbers. `null` and mismatched
/// types are incomparable.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::String(b)) => {
            a.as_f64()?.partial_cmp(&b.trim().parse::<f64>().ok()?)
        }
        (Value::String(a), Value::Number(b)) => {
            a.trim().parse::<f64>().ok()?.partial_cmp(&b.as_f64()?)
        }
        (Value::Bool(a), Value::Number(b)) => f64::from(u8::from(*a)).partial_cmp(&b.as_f64()?),
        (Value::Number(a), Value::Bool(b)) => a.as_f64()?.partial_cmp(&f64::from(u8::from(*b))),
        _ => None,
    }
}
