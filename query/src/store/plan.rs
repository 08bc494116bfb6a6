//! Join planning shared by the stores
//!
//! Scopes collect join descriptors as they are folded, possibly with
//! repeats. Planning flattens them into one join per distinct hop chain,
//! resolves each hop through the catalog and names the joined table after the
//! pluralized hop, which is the name predicates use.

use std::collections::HashMap;

use super::catalog::{Association, Catalog};
use crate::error::StoreError;
use crate::scope::JoinDescriptor;
use crate::utils::inflect::pluralize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    /// Used for an eager-loaded relation no filter joins through
    Left,
}

impl JoinKind {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT OUTER JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJoin {
    /// Alias of the table the hop starts from
    pub owner_alias: String,
    /// Alias the joined table is referenced by
    pub alias: String,
    /// Real table being joined
    pub table: String,
    pub association: Association,
    pub kind: JoinKind,
}

/// Plan joins for a scope on `base_table`
///
/// The eager relation, if any, is planned first as a left join. A filter
/// join sharing a hop chain with it turns that hop into an inner join.
pub fn plan_joins(
    catalog: &Catalog,
    base_table: &str,
    joins: &[JoinDescriptor],
    eager: Option<&str>,
) -> Result<Vec<PlannedJoin>, StoreError> {
    let mut planned: Vec<PlannedJoin> = Vec::new();
    let mut by_chain: HashMap<Vec<String>, usize> = HashMap::new();
    let mut alias_tables: HashMap<String, String> = HashMap::new();
    alias_tables.insert(base_table.to_string(), base_table.to_string());

    let eager_chain = eager.map(|relation| (vec![relation], JoinKind::Left));
    let chains = eager_chain
        .into_iter()
        .chain(joins.iter().map(|join| (join.chain(), JoinKind::Inner)));

    for (chain, kind) in chains {
        let mut owner_alias = base_table.to_string();
        let mut prefix: Vec<String> = Vec::with_capacity(chain.len());
        for hop in chain {
            prefix.push(hop.to_string());
            if let Some(&index) = by_chain.get(&prefix) {
                if kind == JoinKind::Inner {
                    planned[index].kind = JoinKind::Inner;
                }
                owner_alias = planned[index].alias.clone();
                continue;
            }

            let owner_table = alias_tables
                .get(&owner_alias)
                .cloned()
                .unwrap_or_else(|| owner_alias.clone());
            let association = catalog.association(&owner_table, hop)?.clone();
            let alias = pluralize(hop);
            if alias_tables.contains_key(&alias) {
                return Err(StoreError::DuplicateAlias(alias));
            }
            alias_tables.insert(alias.clone(), association.target.clone());
            by_chain.insert(prefix.clone(), planned.len());
            planned.push(PlannedJoin {
                owner_alias: owner_alias.clone(),
                alias: alias.clone(),
                table: association.target.clone(),
                association,
                kind,
            });
            owner_alias = alias;
        }
    }

    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new()
            .table("posts", "Post")
            .table("comments", "Comment")
            .table("users", "User")
            .has_many("posts", "comments", "comments", "post_id")
            .belongs_to("comments", "author", "users", "author_id")
    }

    #[test]
    fn test_identical_joins_are_planned_once() {
        let comments = JoinDescriptor::association("comments");
        let planned =
            plan_joins(&catalog(), "posts", &[comments.clone(), comments], None).unwrap();

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].alias, "comments");
        assert_eq!(planned[0].owner_alias, "posts");
        assert_eq!(planned[0].kind, JoinKind::Inner);
    }

    #[test]
    fn test_nested_join_shares_prefix() {
        let nested = JoinDescriptor::from_hops(&["comments", "author"]).unwrap();
        let planned = plan_joins(
            &catalog(),
            "posts",
            &[JoinDescriptor::association("comments"), nested],
            None,
        )
        .unwrap();

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[1].owner_alias, "comments");
        assert_eq!(planned[1].alias, "authors");
        assert_eq!(planned[1].table, "users");
    }

    #[test]
    fn test_eager_relation_is_left_unless_filtered_through() {
        let planned = plan_joins(&catalog(), "posts", &[], Some("comments")).unwrap();
        assert_eq!(planned[0].kind, JoinKind::Left);

        let planned = plan_joins(
            &catalog(),
            "posts",
            &[JoinDescriptor::association("comments")],
            Some("comments"),
        )
        .unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].kind, JoinKind::Inner);
    }

    #[test]
    fn test_alias_reached_twice_is_rejected() {
        // comments.post aliases back onto the base table
        let back = JoinDescriptor::from_hops(&["comments", "post"]).unwrap();
        let catalog = catalog().belongs_to("comments", "post", "posts", "post_id");
        let err = plan_joins(&catalog, "posts", &[back], None).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateAlias(alias) if alias == "posts"));
    }

    #[test]
    fn test_unknown_hop_is_a_store_error() {
        let err = plan_joins(
            &catalog(),
            "posts",
            &[JoinDescriptor::association("tags")],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::UnknownAssociation { .. }));
    }
}
