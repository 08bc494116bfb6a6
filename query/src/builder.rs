//! Query builder
//!
//! Folds a [`QueryDefinition`] onto a base scope: every ordering first, in
//! declaration order, then the steps of each filter that has a runtime value,
//! in the order the values were supplied. Filters without a value contribute
//! nothing; values without a declared filter are ignored.

use serde_json::Value;

use crate::definition::QueryDefinition;
use crate::scope::Scope;
use crate::value::{FilterName, FilterValues};

/// One-shot builder holding a definition and the values for a single call
pub struct QueryBuilder<'a> {
    definition: &'a QueryDefinition,
    values: &'a FilterValues,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(definition: &'a QueryDefinition, values: &'a FilterValues) -> Self {
        Self { definition, values }
    }

    pub fn apply<S: Scope>(&self, base_scope: S) -> S {
        let ordered = self.apply_ordering(base_scope);
        self.apply_filters(ordered)
    }

    fn apply_ordering<S: Scope>(&self, scope: S) -> S {
        self.definition
            .orderings()
            .iter()
            .fold(scope, |scope, ordering| scope.order(ordering))
    }

    fn apply_filters<S: Scope>(&self, scope: S) -> S {
        self.values.iter().fold(scope, |scope, (filter, value)| {
            self.apply_predicates(scope, filter, value)
        })
    }

    fn apply_predicates<S: Scope>(&self, scope: S, filter: &FilterName, value: &Value) -> S {
        let steps = self.definition.steps(filter);
        if steps.is_empty() {
            tracing::trace!(filter = %filter, "No steps declared for filter, skipping");
            return scope;
        }
        tracing::trace!(filter = %filter, steps = steps.len(), "Applying filter");
        steps.iter().fold(scope, |scope, step| step.apply(scope, value))
    }
}

/// Apply `definition` to `base_scope` with the given filter values
pub fn apply<S: Scope>(base_scope: S, definition: &QueryDefinition, values: &FilterValues) -> S {
    QueryBuilder::new(definition, values).apply(base_scope)
}
