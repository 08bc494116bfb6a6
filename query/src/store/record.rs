//! Records returned by the bundled stores

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::constants::PRIMARY_KEY;
use crate::scope::BackLink;

/// A row as a JSON object, plus any parent references set by the children
/// resolver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
    references: BTreeMap<String, Record>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            references: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn id(&self) -> Option<&Value> {
        self.get(PRIMARY_KEY)
    }

    /// Stable key for the primary key, used to deduplicate rows
    pub fn id_key(&self) -> Option<String> {
        self.id().filter(|id| !id.is_null()).map(Value::to_string)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Parent this record was back-linked to, by reference name
    pub fn reference(&self, name: &str) -> Option<&Record> {
        self.references.get(name)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl BackLink for Record {
    fn back_link(&mut self, reference: &str, parent: &Self) {
        self.references.insert(reference.to_string(), parent.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(fields) => Record::new(fields),
            _ => Record::default(),
        }
    }

    #[test]
    fn test_id_key() {
        assert_eq!(record(json!({"id": 7})).id_key().as_deref(), Some("7"));
        assert_eq!(record(json!({"id": "a"})).id_key().as_deref(), Some("\"a\""));
        assert_eq!(record(json!({"id": null})).id_key(), None);
        assert_eq!(record(json!({})).id_key(), None);
    }

    #[test]
    fn test_back_link_sets_reference() {
        let parent = record(json!({"id": 1, "title": "hello"}));
        let mut child = record(json!({"id": 10, "post_id": 1}));
        child.back_link("post", &parent);

        assert_eq!(child.reference("post"), Some(&parent));
        assert!(child.reference("author").is_none());
    }
}
