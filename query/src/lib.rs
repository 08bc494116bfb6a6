//! # index-query
//!
//! Declarative filtering for index endpoints. Declare once which fields can
//! be filtered, with which operators and under which names, then fold the
//! request's `with` values onto a base scope. Filters whose value is absent
//! do nothing; fields behind relationships get their join automatically.
//!
//! ```
//! use index_query::{Operator, QueryOptions, query};
//! use index_query::store::{Catalog, MemoryStore};
//! use serde_json::json;
//!
//! let catalog = Catalog::new()
//!     .table("posts", "Post")
//!     .table("comments", "Comment")
//!     .has_many("posts", "comments", "comments", "post_id");
//! let mut store = MemoryStore::new(catalog);
//! store.insert("posts", json!({"id": 1, "title": "Hello"})).unwrap();
//! store.insert("posts", json!({"id": 2, "title": "Tips"})).unwrap();
//! store
//!     .insert("comments", json!({"id": 1, "post_id": 2, "text": "Amazing"}))
//!     .unwrap();
//!
//! let options = QueryOptions::new().with_filter("comment_text", "amazing");
//! let scope = query(store.scope("posts").unwrap(), &options, |q| {
//!     q.filter_field("title");
//!     q.declare_filter("comments.text", [(Operator::Contains, "comment_text")]);
//!     q.order_by("title ASC")?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let titles: Vec<_> = scope
//!     .records()
//!     .unwrap()
//!     .iter()
//!     .filter_map(|post| post.get("title").cloned())
//!     .collect();
//! assert_eq!(titles, vec![json!("Tips")]);
//! ```

pub mod builder;
pub mod constants;
pub mod definition;
pub mod error;
pub mod query;
pub mod scope;
pub mod store;
pub mod utils;
pub mod value;

#[cfg(test)]
mod testing;

pub use builder::QueryBuilder;
pub use definition::{FieldPath, Operator, QueryDefinition, Step};
pub use error::{QueryError, StoreError};
pub use query::{children_of, query, query_children, query_children_scope};
pub use scope::{BackLink, EagerLoad, Family, LoadFamilies, Scope};
pub use value::{FilterName, FilterValues, QueryOptions};
