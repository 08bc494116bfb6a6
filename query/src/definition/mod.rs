//! Query definition DSL
//!
//! A [`QueryDefinition`] accumulates, per filter name, the ordered steps that
//! filter applies (joins first where a field sits behind a relationship), and
//! separately the orderings to apply. It is filled once by the caller's
//! declaration closure and then only read.
//!
//! ```
//! use index_query::definition::{Operator, QueryDefinition};
//!
//! let mut query = QueryDefinition::new();
//! query.filter_field("received");
//! query.declare_filter("reference", [(Operator::Contains, "reference")]);
//! query.declare_filter(
//!     "expected_delivery_at",
//!     [
//!         (Operator::GreaterThanOrEqualTo, "from_expected_delivery_at"),
//!         (Operator::LessThan, "to_expected_delivery_at"),
//!     ],
//! );
//! query.declare_filter("receive_order_items.sku.code", [(Operator::EqualTo, "sku_code")]);
//! query.order_by("expected_delivery_at DESC, receive_orders.id DESC").unwrap();
//!
//! assert_eq!(query.filter_names().count(), 5);
//! ```

mod declaration;
mod field_path;
mod operator;
mod step;

pub use declaration::{DeclarationSet, FieldSpec, FilterDeclaration, parse_declarations};
pub use field_path::FieldPath;
pub use operator::Operator;
pub use step::{Step, TableRef};

use std::collections::BTreeMap;

use crate::error::QueryError;
use crate::scope::OrderingSpec;
use crate::value::FilterName;

#[derive(Debug, Clone, Default)]
pub struct QueryDefinition {
    filters: BTreeMap<FilterName, Vec<Step>>,
    orderings: Vec<OrderingSpec>,
}

impl QueryDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter a field by equality, under a filter named after the path
    pub fn filter_field(&mut self, path: impl Into<FieldPath>) -> &mut Self {
        let path = path.into();
        let name = FilterName::new(path.to_string());
        self.declare_filter(path, [(Operator::EqualTo, name)])
    }

    /// Declare how a field is filtered: one predicate per
    /// `(operator, filter name)` pair
    ///
    /// A path behind relationship hops gets one join step per filter name,
    /// ahead of the predicates that need it.
    pub fn declare_filter<I, N>(&mut self, path: impl Into<FieldPath>, operators: I) -> &mut Self
    where
        I: IntoIterator<Item = (Operator, N)>,
        N: Into<FilterName>,
    {
        let path = path.into();
        let join = path.join_descriptor().map(|descriptor| Step::Join { descriptor });
        let table = match path.target_table() {
            Some(table) => TableRef::Named(table),
            None => TableRef::Base,
        };

        for (operator, filter) in operators {
            let filter = filter.into();
            tracing::trace!(
                path = %path,
                operator = %operator,
                filter = %filter,
                "Declaring filter"
            );
            let steps = self.filters.entry(filter.clone()).or_default();
            if let Some(join) = &join
                && !steps.contains(join)
            {
                steps.push(join.clone());
            }
            steps.push(Step::Predicate {
                table: table.clone(),
                field: path.field_name().to_string(),
                operator,
                filter,
            });
        }
        self
    }

    /// Textual form of [`declare_filter`](Self::declare_filter)
    ///
    /// Every operator token is checked before anything is declared, so an
    /// unknown operator leaves the definition untouched.
    pub fn filter_field_with<'a, I>(
        &mut self,
        path: impl Into<FieldPath>,
        operators: I,
    ) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let parsed = operators
            .into_iter()
            .map(|(token, filter)| -> Result<_, QueryError> {
                Ok((token.parse::<Operator>()?, FilterName::new(filter)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.declare_filter(path, parsed))
    }

    /// Append an ordering; orderings accumulate in declaration order
    pub fn declare_ordering(&mut self, ordering: OrderingSpec) -> &mut Self {
        self.orderings.push(ordering);
        self
    }

    /// Append an ordering from its text form, e.g. `"view_count DESC"`
    pub fn order_by(&mut self, text: &str) -> Result<&mut Self, QueryError> {
        let ordering: OrderingSpec = text.parse()?;
        Ok(self.declare_ordering(ordering))
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &FilterName> {
        self.filters.keys()
    }

    /// Steps declared for a filter, empty when undeclared
    pub fn steps(&self, filter: &FilterName) -> &[Step] {
        self.filters.get(filter).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn orderings(&self) -> &[OrderingSpec] {
        &self.orderings
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.orderings.is_empty()
    }
}
