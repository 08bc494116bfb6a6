//! Backing store seam
//!
//! A [`Scope`] is an opaque, composable query value owned by a backing store.
//! Every operation consumes the scope and returns a refined one, so a base
//! scope handed to the builder is never mutated in place; clone it first to
//! keep it around.
//!
//! The children resolver needs two more capabilities: eager-loading a named
//! relation ([`EagerLoad`]) and, for stores that can materialize
//! synchronously, handing back `(parent, children)` pairs
//! ([`LoadFamilies`]). Asynchronous stores produce the same [`Family`]
//! values from their own fetch methods.

mod condition;
mod join;
mod ordering;

pub use condition::{Column, Comparison, Condition, compare_values, value_text};
pub use join::JoinDescriptor;
pub use ordering::{Direction, OrderTerm, OrderingSpec};

use crate::error::StoreError;

pub trait Scope: Sized {
    /// The scope's own primary table, used for single-hop field paths
    fn table_name(&self) -> &str;

    /// Add a conjunctive condition (SQL `WHERE`)
    fn filter(self, condition: Condition) -> Self;

    /// Add a join along a relationship path. Applying an identical
    /// descriptor twice must not be an error.
    fn joins(self, descriptor: &JoinDescriptor) -> Self;

    /// Append an ordering after any existing ones
    fn order(self, ordering: &OrderingSpec) -> Self;
}

pub trait EagerLoad: Scope {
    /// Entity name of the scope's records (`ReceiveOrder`), used to name
    /// the inverse reference on children
    fn entity_name(&self) -> &str;

    /// Load the named child relation alongside every parent record
    fn eager_load(self, relation: &str) -> Self;
}

pub trait LoadFamilies: EagerLoad {
    type Record: BackLink;

    /// Materialize distinct parents, in result order, each with its loaded
    /// children
    fn families(&self, relation: &str) -> Result<Vec<Family<Self::Record>>, StoreError>;
}

/// A record that can point back at the parent it was loaded under
pub trait BackLink {
    fn back_link(&mut self, reference: &str, parent: &Self);
}

/// A parent record with the children loaded for it
#[derive(Debug, Clone, PartialEq)]
pub struct Family<R> {
    pub parent: R,
    pub children: Vec<R>,
}

impl<R> Family<R> {
    pub fn new(parent: R, children: Vec<R>) -> Self {
        Self { parent, children }
    }
}
