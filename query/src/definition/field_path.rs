//! Field paths
//!
//! A field path is either a bare field on the scope's own table (`title`) or
//! relationship hops followed by a field (`comments.text`,
//! `receive_order_items.sku.code`).

use std::fmt;

use crate::error::QueryError;
use crate::scope::JoinDescriptor;
use crate::utils::inflect::pluralize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    hops: Vec<String>,
    field: String,
}

impl FieldPath {
    /// A field on the scope's own table
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            hops: Vec::new(),
            field: name.into(),
        }
    }

    /// A field reached through relationship hops
    pub fn through<I, S>(hops: I, field: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hops: hops.into_iter().map(Into::into).collect(),
            field: field.into(),
        }
    }

    /// Build from segments where the last one is the field
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, QueryError> {
        let Some((field, hops)) = segments.split_last() else {
            return Err(QueryError::invalid_declaration("field path is empty"));
        };
        if segments.iter().any(|s| s.as_ref().trim().is_empty()) {
            return Err(QueryError::invalid_declaration(
                "field path has an empty segment",
            ));
        }
        Ok(Self::through(
            hops.iter().map(|hop| hop.as_ref().trim().to_string()),
            field.as_ref().trim(),
        ))
    }

    pub fn hops(&self) -> &[String] {
        &self.hops
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// True when the field lives on the scope's own table
    pub fn is_direct(&self) -> bool {
        self.hops.is_empty()
    }

    /// Join needed to reach the field, if any
    pub fn join_descriptor(&self) -> Option<JoinDescriptor> {
        JoinDescriptor::from_hops(&self.hops)
    }

    /// Table predicates reference: the pluralized last hop
    pub fn target_table(&self) -> Option<String> {
        self.hops.last().map(|hop| pluralize(hop))
    }
}

/// Dotted text splits into hops and a field: `comments.text`
impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((hops, field)) => Self::through(hops.split('.'), field),
            None => Self::field(path),
        }
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.hops {
            write!(f, "{}.", hop)?;
        }
        f.write_str(&self.field)
    }
}
