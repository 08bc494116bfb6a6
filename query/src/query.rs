//! Entry points
//!
//! [`query`] runs a caller's declarations against a fresh [`QueryDefinition`]
//! and folds the normalized `with` values onto the base scope.
//! [`query_children`] does the same on a scope that eager-loads a child
//! relation, then hands back the children, each linked to its parent.

use crate::builder::QueryBuilder;
use crate::definition::QueryDefinition;
use crate::error::QueryError;
use crate::scope::{BackLink, EagerLoad, Family, LoadFamilies, Scope};
use crate::utils::inflect::reference_name;
use crate::value::QueryOptions;

/// Build a filtered, ordered scope
///
/// `declare` populates the definition; a declaration error (for example an
/// unknown operator name) is returned before any value is looked at.
///
/// ```
/// use index_query::{Operator, QueryOptions, query};
/// use index_query::store::{Catalog, MemoryStore};
/// use serde_json::json;
///
/// let mut store = MemoryStore::new(Catalog::new().table("posts", "Post"));
/// store.insert("posts", json!({"id": 1, "view_count": 5})).unwrap();
/// store.insert("posts", json!({"id": 2, "view_count": 10})).unwrap();
///
/// let options = QueryOptions::new().with_filter("threshold", 6);
/// let scope = query(store.scope("posts").unwrap(), &options, |q| {
///     q.declare_filter("view_count", [(Operator::GreaterThanOrEqualTo, "threshold")]);
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(scope.records().unwrap().len(), 1);
/// ```
pub fn query<S, F>(base_scope: S, options: &QueryOptions, declare: F) -> Result<S, QueryError>
where
    S: Scope,
    F: FnOnce(&mut QueryDefinition) -> Result<(), QueryError>,
{
    let mut definition = QueryDefinition::new();
    declare(&mut definition)?;

    let values = options.filters();
    tracing::debug!(
        table = base_scope.table_name(),
        filters = values.len(),
        orderings = definition.orderings().len(),
        "Building query"
    );
    Ok(QueryBuilder::new(&definition, &values).apply(base_scope))
}

/// [`query`] on `base_scope` with `child_relation` eager-loaded
///
/// For stores that materialize asynchronously: fetch families from the
/// returned scope, then pass them to [`children_of`].
pub fn query_children_scope<S, F>(
    child_relation: &str,
    base_scope: S,
    options: &QueryOptions,
    declare: F,
) -> Result<S, QueryError>
where
    S: EagerLoad,
    F: FnOnce(&mut QueryDefinition) -> Result<(), QueryError>,
{
    query(base_scope.eager_load(child_relation), options, declare)
}

/// Children of every parent the query matches, flattened in parent order
///
/// Each child's reference named after the parent entity in snake case
/// (`receive_order` for `ReceiveOrder`) is set to its parent.
pub fn query_children<S, F>(
    child_relation: &str,
    base_scope: S,
    options: &QueryOptions,
    declare: F,
) -> Result<Vec<S::Record>, QueryError>
where
    S: LoadFamilies,
    F: FnOnce(&mut QueryDefinition) -> Result<(), QueryError>,
{
    let reference = reference_name(base_scope.entity_name());
    let scope = query_children_scope(child_relation, base_scope, options, declare)?;
    let families = scope.families(child_relation)?;
    Ok(children_of(families, &reference))
}

/// Back-link every child to its parent under `reference` and flatten
pub fn children_of<R: BackLink>(families: Vec<Family<R>>, reference: &str) -> Vec<R> {
    families
        .into_iter()
        .flat_map(|Family { parent, children }| {
            children.into_iter().map(move |mut child| {
                child.back_link(reference, &parent);
                child
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Operator;
    use crate::error::StoreError;
    use crate::scope::JoinDescriptor;
    use crate::store::{Backend, Catalog, MemoryStore, Record, SqlScope};
    use crate::testing::{blog_catalog, blog_pool, blog_store};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn ids(records: &[Record]) -> Vec<i64> {
        records
            .iter()
            .filter_map(|record| record.id().and_then(Value::as_i64))
            .collect()
    }

    fn post_filters(q: &mut QueryDefinition) -> Result<(), QueryError> {
        q.filter_field("title");
        q.declare_filter("title", [(Operator::Contains, "title_contains")]);
        q.declare_filter(
            "view_count",
            [
                (Operator::GreaterThanOrEqualTo, "min_views"),
                (Operator::LessThan, "views_below"),
                (Operator::LessThanOrEqualTo, "max_views"),
            ],
        );
        q.declare_filter("published_at", [(Operator::PresentIf, "published")]);
        q.filter_field("published_at");
        q.filter_field("id");
        q.declare_filter("comments.text", [(Operator::Contains, "comment_text")]);
        Ok(())
    }

    fn matching(options: QueryOptions) -> Vec<i64> {
        let store = blog_store();
        let scope = query(store.scope("posts").unwrap(), &options, post_filters).unwrap();
        ids(&scope.records().unwrap())
    }

    #[test]
    fn test_absent_filters_leave_scope_untouched() {
        let store = blog_store();
        let declared = query(
            store.scope("posts").unwrap(),
            &QueryOptions::new(),
            post_filters,
        )
        .unwrap();
        let bare = query(store.scope("posts").unwrap(), &QueryOptions::new(), |_| Ok(())).unwrap();

        assert_eq!(declared.conditions(), bare.conditions());
        assert_eq!(declared.join_descriptors(), bare.join_descriptors());
        assert_eq!(declared.records().unwrap(), bare.records().unwrap());
    }

    #[test]
    fn test_each_operator_narrows() {
        let with = |name: &str, value: Value| QueryOptions::new().with_filter(name, value);

        assert_eq!(matching(with("title", json!("Hello"))), vec![1]);
        assert_eq!(matching(with("title_contains", json!("TIPS"))), vec![2]);
        assert_eq!(matching(with("min_views", json!(11))), vec![2, 3]);
        assert_eq!(matching(with("views_below", json!(11))), vec![1]);
        assert_eq!(matching(with("max_views", json!(11))), vec![1, 2]);
        assert_eq!(matching(with("published", json!(true))), vec![1, 2]);
        assert_eq!(matching(with("published", json!(false))), vec![3]);
    }

    #[test]
    fn test_equal_to_null_and_lists() {
        let with = |name: &str, value: Value| QueryOptions::new().with_filter(name, value);

        assert_eq!(matching(with("published_at", Value::Null)), vec![3]);
        assert_eq!(matching(with("id", json!([1, 3]))), vec![1, 3]);
    }

    #[test]
    fn test_contains_matches_literally() {
        let options = QueryOptions::new().with_filter("title_contains", "%");
        assert!(matching(options).is_empty());
    }

    #[test]
    fn test_fan_out_and_combines() {
        let store = blog_store();
        let options = QueryOptions::new().with_filter("term", "rust");
        let scope = query(store.scope("posts").unwrap(), &options, |q| {
            q.declare_filter("title", [(Operator::Contains, "term")]);
            q.declare_filter("category", [(Operator::Contains, "term")]);
            Ok(())
        })
        .unwrap();

        assert_eq!(scope.conditions().len(), 2);
        assert_eq!(ids(&scope.records().unwrap()), vec![2]);
    }

    #[test]
    fn test_unknown_operator_fails_before_values() {
        let store = blog_store();
        let err = query(store.scope("posts").unwrap(), &QueryOptions::new(), |q| {
            q.filter_field_with("view_count", [("unkown_operator", "view_count")])?;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, QueryError::UnknownOperator(_)));
        assert!(err.to_string().contains("unkown_operator"));
    }

    #[test]
    fn test_symbol_and_string_keys_are_equivalent() {
        let store = blog_store();
        let run = |key: &str| {
            let options = QueryOptions::new().with_filter(key, 11);
            query(store.scope("posts").unwrap(), &options, post_filters).unwrap()
        };
        let plain = run("min_views");
        let symbol = run(":min_views");

        assert_eq!(plain.conditions(), symbol.conditions());
        assert_eq!(plain.records().unwrap(), symbol.records().unwrap());
    }

    #[test]
    fn test_threshold_scenario() {
        let mut store = MemoryStore::new(Catalog::new().table("posts", "Post"));
        store.insert("posts", json!({"id": 1, "view_count": 5})).unwrap();
        store.insert("posts", json!({"id": 2, "view_count": 10})).unwrap();
        let declare = |q: &mut QueryDefinition| {
            q.declare_filter("view_count", [(Operator::GreaterThanOrEqualTo, "threshold")]);
            Ok(())
        };

        let options = QueryOptions::new().with_filter("threshold", 5);
        let scope = query(store.scope("posts").unwrap(), &options, declare).unwrap();
        assert_eq!(scope.records().unwrap().len(), 2);

        let options = QueryOptions::new().with_filter("threshold", 11);
        let scope = query(store.scope("posts").unwrap(), &options, declare).unwrap();
        assert!(scope.records().unwrap().is_empty());
    }

    #[test]
    fn test_multi_hop_contains_adds_one_join() {
        let store = blog_store();
        let options = QueryOptions::new().with_filter("comment_text", "amazing");
        let scope = query(store.scope("posts").unwrap(), &options, |q| {
            q.declare_filter(
                "comments.text",
                [
                    (Operator::Contains, "comment_text"),
                    (Operator::EqualTo, "comment_exact"),
                ],
            );
            Ok(())
        })
        .unwrap();

        assert_eq!(
            scope.join_descriptors(),
            &[JoinDescriptor::association("comments")]
        );
        assert_eq!(scope.join_plan().unwrap().len(), 1);
        assert_eq!(ids(&scope.records().unwrap()), vec![2]);
    }

    #[test]
    fn test_orderings_precede_filters() {
        let store = blog_store();
        let options = QueryOptions::new().with_filter("min_views", 0);
        let scope = query(store.scope("posts").unwrap(), &options, |q| {
            post_filters(q)?;
            q.order_by("view_count DESC")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(scope.orderings().len(), 1);
        assert_eq!(ids(&scope.records().unwrap()), vec![3, 2, 1]);
    }

    #[test]
    fn test_query_children_with_no_parents() {
        let store = blog_store();
        let options = QueryOptions::new().with_filter("title", "missing");
        let children =
            query_children("comments", store.scope("posts").unwrap(), &options, post_filters)
                .unwrap();
        assert!(children.is_empty());
    }

    #[test]
    fn test_query_children_flattens_and_back_links() {
        let store = blog_store();
        let children = query_children(
            "comments",
            store.scope("posts").unwrap(),
            &QueryOptions::new(),
            post_filters,
        )
        .unwrap();

        assert_eq!(ids(&children), vec![10, 11, 12]);
        for child in &children {
            let parent = child.reference("post").unwrap();
            assert_eq!(parent.id(), child.get("post_id"));
        }
    }

    #[test]
    fn test_query_children_filters_through_child_path() {
        let store = blog_store();
        let options = QueryOptions::new().with_filter("comment_text", "amazing");
        let children =
            query_children("comments", store.scope("posts").unwrap(), &options, post_filters)
                .unwrap();

        // the eager load shares the filter's join
        assert_eq!(ids(&children), vec![12]);
        assert_eq!(
            children[0].reference("post").and_then(Record::id),
            Some(&json!(2))
        );
    }

    #[test]
    fn test_query_children_reference_uses_snake_case_entity() {
        let mut store = MemoryStore::new(
            Catalog::new()
                .table("receive_orders", "ReceiveOrder")
                .table("receive_order_items", "ReceiveOrderItem")
                .has_many(
                    "receive_orders",
                    "receive_order_items",
                    "receive_order_items",
                    "receive_order_id",
                ),
        );
        store
            .insert("receive_orders", json!({"id": 1, "reference": "PO-1"}))
            .unwrap();
        store
            .insert_all(
                "receive_order_items",
                json!([
                    {"id": 1, "receive_order_id": 1},
                    {"id": 2, "receive_order_id": 1},
                ]),
            )
            .unwrap();

        let children = query_children(
            "receive_order_items",
            store.scope("receive_orders").unwrap(),
            &QueryOptions::new(),
            |_| Ok(()),
        )
        .unwrap();

        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.reference("receive_order").is_some()));
    }

    #[test]
    fn test_store_errors_propagate() {
        let store = blog_store();
        let options = QueryOptions::new().with_filter("tag", "rust");
        let scope = query(store.scope("posts").unwrap(), &options, |q| {
            q.declare_filter("tags.name", [(Operator::EqualTo, "tag")]);
            Ok(())
        })
        .unwrap();

        // the filter fired, so the unknown association reaches the store
        assert_eq!(scope.join_descriptors().len(), 1);
        let err = QueryError::from(scope.records().unwrap_err());
        assert!(matches!(
            err,
            QueryError::Store(StoreError::UnknownAssociation { .. })
        ));
        assert!(!err.is_declaration_error());
    }

    #[tokio::test]
    async fn test_sql_store_children() -> anyhow::Result<()> {
        let pool = blog_pool().await?;
        let base = SqlScope::new(Arc::new(blog_catalog()), "posts", Backend::Sqlite)?;
        let reference = reference_name(base.entity_name());
        let options = QueryOptions::new().with_filter("max_views", 11);

        let scope = query_children_scope("comments", base, &options, |q| {
            post_filters(q)?;
            q.order_by("id ASC")?;
            Ok(())
        })?;
        let children = children_of(scope.fetch_families(&pool, "comments").await?, &reference);

        assert_eq!(ids(&children), vec![10, 11, 12]);
        assert!(children.iter().all(|c| c.reference("post").is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn test_sql_store_multi_hop_contains() -> anyhow::Result<()> {
        let pool = blog_pool().await?;
        let base = SqlScope::new(Arc::new(blog_catalog()), "posts", Backend::Sqlite)?;
        let options = QueryOptions::new().with_filter("comment_text", "AMAZING");

        let scope = query(base, &options, post_filters)?;
        assert_eq!(scope.join_plan()?.len(), 1);
        assert_eq!(ids(&scope.fetch_all(&pool).await?), vec![2]);
        Ok(())
    }
}
