//! Table and association catalog
//!
//! Both stores need to know each table's entity name and how an association
//! hop links an owner table to its target. This is deliberately thin: no
//! column types, no validation of field names.

use std::collections::BTreeMap;

use crate::constants::PRIMARY_KEY;
use crate::error::StoreError;
use crate::scope::Column;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationKind {
    /// Foreign key lives on the target and points at the owner's id
    HasMany { foreign_key: String },
    /// Foreign key lives on the owner and points at the target's id
    BelongsTo { foreign_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub target: String,
    pub kind: AssociationKind,
}

impl Association {
    /// Fields equated by the join: `(target field, owner field)`
    pub fn key_fields(&self) -> (&str, &str) {
        match &self.kind {
            AssociationKind::HasMany { foreign_key } => (foreign_key, PRIMARY_KEY),
            AssociationKind::BelongsTo { foreign_key } => (PRIMARY_KEY, foreign_key),
        }
    }

    /// Columns equated by the join: `(target side, owner side)`
    pub fn join_columns(&self, owner_alias: &str, target_alias: &str) -> (Column, Column) {
        let (target_field, owner_field) = self.key_fields();
        (
            Column::new(target_alias, target_field),
            Column::new(owner_alias, owner_field),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: BTreeMap<String, String>,
    associations: BTreeMap<(String, String), Association>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table and the entity its rows represent
    pub fn table(mut self, table: &str, entity: &str) -> Self {
        self.entities.insert(table.to_string(), entity.to_string());
        self
    }

    /// `owner` has many `target` rows through `target.foreign_key`
    pub fn has_many(self, owner: &str, name: &str, target: &str, foreign_key: &str) -> Self {
        self.associate(
            owner,
            name,
            target,
            AssociationKind::HasMany {
                foreign_key: foreign_key.to_string(),
            },
        )
    }

    /// Single-row variant of [`has_many`](Self::has_many); joins the same way
    pub fn has_one(self, owner: &str, name: &str, target: &str, foreign_key: &str) -> Self {
        self.has_many(owner, name, target, foreign_key)
    }

    /// `owner.foreign_key` points at a `target` row
    pub fn belongs_to(self, owner: &str, name: &str, target: &str, foreign_key: &str) -> Self {
        self.associate(
            owner,
            name,
            target,
            AssociationKind::BelongsTo {
                foreign_key: foreign_key.to_string(),
            },
        )
    }

    fn associate(mut self, owner: &str, name: &str, target: &str, kind: AssociationKind) -> Self {
        self.associations.insert(
            (owner.to_string(), name.to_string()),
            Association {
                target: target.to_string(),
                kind,
            },
        );
        self
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.entities.contains_key(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn entity(&self, table: &str) -> Result<&str, StoreError> {
        self.entities
            .get(table)
            .map(String::as_str)
            .ok_or_else(|| StoreError::unknown_table(table))
    }

    pub fn association(&self, owner: &str, name: &str) -> Result<&Association, StoreError> {
        self.associations
            .get(&(owner.to_string(), name.to_string()))
            .ok_or_else(|| StoreError::unknown_association(owner, name))
    }
}
