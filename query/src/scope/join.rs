//! Nested join descriptors
//!
//! A relationship path `[a, b, c]` is folded right to left into
//! `{a: {b: c}}`: the hop closest to the field is the deepest key.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinDescriptor {
    /// A single association hop
    Association(String),
    /// A hop followed by further joins from the table it lands on
    Nested {
        association: String,
        inner: Box<JoinDescriptor>,
    },
}

impl JoinDescriptor {
    pub fn association(name: impl Into<String>) -> Self {
        Self::Association(name.into())
    }

    /// Fold hops right to left. Returns `None` for an empty path.
    pub fn from_hops<S: AsRef<str>>(hops: &[S]) -> Option<Self> {
        let (last, rest) = hops.split_last()?;
        let innermost = Self::Association(last.as_ref().to_string());
        Some(rest.iter().rev().fold(innermost, |inner, hop| Self::Nested {
            association: hop.as_ref().to_string(),
            inner: Box::new(inner),
        }))
    }

    /// The outermost hop, joined from the scope's own table
    pub fn root(&self) -> &str {
        match self {
            Self::Association(name) => name,
            Self::Nested { association, .. } => association,
        }
    }

    /// Hops from outermost to innermost
    pub fn chain(&self) -> Vec<&str> {
        let mut hops = Vec::new();
        let mut current = self;
        loop {
            match current {
                Self::Association(name) => {
                    hops.push(name.as_str());
                    return hops;
                }
                Self::Nested { association, inner } => {
                    hops.push(association.as_str());
                    current = inner;
                }
            }
        }
    }
}

impl fmt::Display for JoinDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Association(name) => write!(f, "{}", name),
            Self::Nested { association, inner } => write!(f, "{{{}: {}}}", association, inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_hop() {
        let descriptor = JoinDescriptor::from_hops(&["comments"]).unwrap();
        assert_eq!(descriptor, JoinDescriptor::association("comments"));
        assert_eq!(descriptor.to_string(), "comments");
    }

    #[test]
    fn test_hops_fold_right_to_left() {
        let descriptor = JoinDescriptor::from_hops(&["receive_order_items", "sku"]).unwrap();
        assert_eq!(
            descriptor,
            JoinDescriptor::Nested {
                association: "receive_order_items".to_string(),
                inner: Box::new(JoinDescriptor::association("sku")),
            }
        );
        assert_eq!(descriptor.to_string(), "{receive_order_items: sku}");
    }

    #[test]
    fn test_chain_round_trips_three_hops() {
        let descriptor = JoinDescriptor::from_hops(&["a", "b", "c"]).unwrap();
        assert_eq!(descriptor.to_string(), "{a: {b: c}}");
        assert_eq!(descriptor.root(), "a");
        assert_eq!(descriptor.chain(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_path_has_no_join() {
        let hops: [&str; 0] = [];
        assert!(JoinDescriptor::from_hops(&hops).is_none());
    }
}
