//! Bundled backing stores
//!
//! Both stores share the [`Catalog`] of tables and associations and the join
//! planner. [`MemoryStore`] evaluates scopes over JSON records in process;
//! [`SqlScope`] renders them to SQL and runs them through `sqlx`.

mod catalog;
mod memory;
mod plan;
mod record;
pub mod sql;

pub use catalog::{Association, AssociationKind, Catalog};
pub use memory::{MemoryScope, MemoryStore};
pub use plan::{JoinKind, PlannedJoin, plan_joins};
pub use record::Record;
pub use sql::{Backend, SqlQuery, SqlScope};
