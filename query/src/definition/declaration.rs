//! JSON declarations
//!
//! Lets a definition be described as data instead of code:
//!
//! ```json
//! {
//!   "filters": [
//!     {"field": "received"},
//!     {"field": "reference", "operators": {"contains": "reference"}},
//!     {"field": ["receive_order_items", "sku", "code"], "operators": {"equal_to": "sku_code"}}
//!   ],
//!   "order_by": ["expected_delivery_at DESC"]
//! }
//! ```
//!
//! Operators go through the textual surface, so an unknown operator name is
//! reported as [`QueryError::UnknownOperator`].

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{FieldPath, QueryDefinition};
use crate::constants::{
    MAX_DECLARATION_JSON_SIZE, MAX_DECLARED_FILTERS, MAX_DECLARED_ORDERINGS,
};
use crate::error::QueryError;

/// A field given either as dotted text or as explicit segments
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Text(String),
    Segments(Vec<String>),
}

impl FieldSpec {
    pub fn to_path(&self) -> Result<FieldPath, QueryError> {
        match self {
            Self::Text(text) => {
                let segments: Vec<&str> = text.split('.').collect();
                FieldPath::from_segments(&segments)
            }
            Self::Segments(segments) => FieldPath::from_segments(segments),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterDeclaration {
    pub field: FieldSpec,
    /// Operator name to filter name. Empty means equality under the field's
    /// own name.
    #[serde(default)]
    pub operators: Map<String, Value>,
}

impl FilterDeclaration {
    pub fn declare(&self, definition: &mut QueryDefinition) -> Result<(), QueryError> {
        let path = self.field.to_path()?;
        if self.operators.is_empty() {
            definition.filter_field(path);
            return Ok(());
        }

        let mut pairs = Vec::with_capacity(self.operators.len());
        for (operator, filter) in &self.operators {
            let Some(filter) = filter.as_str() else {
                return Err(QueryError::invalid_declaration(format!(
                    "filter name for operator '{}' on '{}' must be a string",
                    operator, path
                )));
            };
            pairs.push((operator.as_str(), filter));
        }
        definition.filter_field_with(path, pairs)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeclarationSet {
    #[serde(default)]
    pub filters: Vec<FilterDeclaration>,
    #[serde(default)]
    pub order_by: Vec<String>,
}

impl DeclarationSet {
    /// Declare every filter, then every ordering, stopping at the first error
    pub fn apply_to(&self, definition: &mut QueryDefinition) -> Result<(), QueryError> {
        for filter in &self.filters {
            filter.declare(definition)?;
        }
        for ordering in &self.order_by {
            definition.order_by(ordering)?;
        }
        Ok(())
    }

    pub fn to_definition(&self) -> Result<QueryDefinition, QueryError> {
        let mut definition = QueryDefinition::new();
        self.apply_to(&mut definition)?;
        Ok(definition)
    }
}

/// Parse a JSON declaration document
///
/// Validates document size and declaration counts before anything is
/// declared.
pub fn parse_declarations(json_str: &str) -> Result<DeclarationSet, QueryError> {
    if json_str.len() > MAX_DECLARATION_JSON_SIZE {
        return Err(QueryError::invalid_declaration(format!(
            "declaration JSON exceeds maximum size of {} bytes",
            MAX_DECLARATION_JSON_SIZE
        )));
    }

    let declarations: DeclarationSet = serde_json::from_str(json_str)
        .map_err(|e| QueryError::invalid_declaration(e.to_string()))?;

    if declarations.filters.len() > MAX_DECLARED_FILTERS {
        return Err(QueryError::invalid_declaration(format!(
            "maximum {} filter declarations allowed",
            MAX_DECLARED_FILTERS
        )));
    }
    if declarations.order_by.len() > MAX_DECLARED_ORDERINGS {
        return Err(QueryError::invalid_declaration(format!(
            "maximum {} orderings allowed",
            MAX_DECLARED_ORDERINGS
        )));
    }

    Ok(declarations)
}
