//! Filter names and runtime filter values
//!
//! Callers hand the entry point a `with` mapping of filter name to value,
//! usually straight out of request parameters. Keys are normalized so that
//! `"view_count"`, `" view_count "` and `":view_count"` all name the same
//! filter.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical filter name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FilterName(String);

impl FilterName {
    pub fn new(name: impl AsRef<str>) -> Self {
        let trimmed = name.as_ref().trim();
        let canonical = trimmed.strip_prefix(':').unwrap_or(trimmed);
        Self(canonical.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FilterName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FilterName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for FilterName {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<FilterName> for String {
    fn from(name: FilterName) -> Self {
        name.0
    }
}

impl fmt::Display for FilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Truthiness used by `present_if`: only `null` and `false` are falsy
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Normalized filter values in insertion order
///
/// Inserting a name that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterValues {
    entries: Vec<(FilterName, Value)>,
}

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<FilterName>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: impl Into<FilterName>) -> Option<&Value> {
        let name = name.into();
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterName, &Value)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterValues
where
    K: Into<FilterName>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

impl From<&Map<String, Value>> for FilterValues {
    fn from(map: &Map<String, Value>) -> Self {
        map.iter().map(|(name, value)| (name, value.clone())).collect()
    }
}

/// Options accepted by the entry points
///
/// Deserializes from `{"with": {...}}`; a missing `with` means no filters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub with: Map<String, Value>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter value, builder style
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with.insert(name.into(), value.into());
        self
    }

    /// Filter values with canonical keys
    pub fn filters(&self) -> FilterValues {
        FilterValues::from(&self.with)
    }
}
