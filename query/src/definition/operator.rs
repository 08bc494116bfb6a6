//! Filter operators
//!
//! Each operator compiles a resolved column and a runtime value into one
//! [`Condition`]. The textual names (`equal_to`, `contains`, ...) are what
//! JSON declarations and [`QueryDefinition::filter_field_with`] accept.
//!
//! [`QueryDefinition::filter_field_with`]: super::QueryDefinition::filter_field_with

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;
use crate::scope::{Column, Comparison, Condition, value_text};
use crate::value::is_truthy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `field = value`; `null` matches NULL, an array matches any element
    EqualTo,
    /// Case-insensitive substring match, `field ILIKE '%value%'`
    Contains,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    /// `IS NOT NULL` when the value is truthy, `IS NULL` otherwise
    PresentIf,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::EqualTo,
        Operator::Contains,
        Operator::GreaterThanOrEqualTo,
        Operator::LessThan,
        Operator::LessThanOrEqualTo,
        Operator::PresentIf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EqualTo => "equal_to",
            Self::Contains => "contains",
            Self::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Self::LessThan => "less_than",
            Self::LessThanOrEqualTo => "less_than_or_equal_to",
            Self::PresentIf => "present_if",
        }
    }

    /// Compile this operator against a column and runtime value
    pub fn condition(&self, column: Column, value: &Value) -> Condition {
        match self {
            Self::EqualTo => match value {
                Value::Null => Condition::IsNull { column },
                Value::Array(values) => Condition::AnyOf {
                    column,
                    values: values.clone(),
                },
                _ => compare(column, Comparison::Eq, value),
            },
            Self::Contains => Condition::Contains {
                column,
                needle: value_text(value),
            },
            Self::GreaterThanOrEqualTo => compare(column, Comparison::Gte, value),
            Self::LessThan => compare(column, Comparison::Lt, value),
            Self::LessThanOrEqualTo => compare(column, Comparison::Lte, value),
            Self::PresentIf => {
                if is_truthy(value) {
                    Condition::IsNotNull { column }
                } else {
                    Condition::IsNull { column }
                }
            }
        }
    }
}

fn compare(column: Column, comparison: Comparison, value: &Value) -> Condition {
    Condition::Compare {
        column,
        comparison,
        value: value.clone(),
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let trimmed = token.trim();
        let name = trimmed.strip_prefix(':').unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|operator| operator.as_str() == name)
            .ok_or_else(|| QueryError::unknown_operator(token))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
