//! Requirement trees
//!
//! Boolean algebra over option keys, attached to an option through the
//! `requires` header field and evaluated after the parsing loop against the
//! keys that were actually specified. The tree is data only; the evaluator
//! lives in [`crate::parse`].

use crate::opts::Value;

/// One requirement node
#[derive(Debug, Clone, PartialEq)]
pub enum Requires {
    /// the key must have been specified
    Present(String),
    /// the key must not have been specified
    Absent(String),
    /// the key must be specified with this value, compared after
    /// normalization
    Equals(String, Value),
    /// every item must hold
    All(Vec<Requires>),
    /// at least one item must hold
    One(Vec<Requires>),
    /// inverts the item, distributing over `All`/`One` by De Morgan
    Not(Box<Requires>),
}

impl Requires {
    #[must_use]
    pub fn present(key: &str) -> Self {
        Requires::Present(key.to_string())
    }

    #[must_use]
    pub fn absent(key: &str) -> Self {
        Requires::Absent(key.to_string())
    }

    #[must_use]
    pub fn equals(key: &str, value: impl Into<Value>) -> Self {
        Requires::Equals(key.to_string(), value.into())
    }

    #[must_use]
    pub fn all(items: impl IntoIterator<Item = Requires>) -> Self {
        Requires::All(items.into_iter().collect())
    }

    #[must_use]
    pub fn one(items: impl IntoIterator<Item = Requires>) -> Self {
        Requires::One(items.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(item: Requires) -> Self {
        Requires::Not(Box::new(item))
    }

    /// Walk every key referenced by any leaf, for validation
    pub(crate) fn visit_keys<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Requires::Present(key) | Requires::Absent(key) | Requires::Equals(key, _) => {
                visit(key);
            }
            Requires::All(items) | Requires::One(items) => {
                for item in items {
                    item.visit_keys(visit);
                }
            }
            Requires::Not(item) => item.visit_keys(visit),
        }
    }

    /// Walk leaves that carry an expected value, for the niladic check
    pub(crate) fn visit_value_leaves<'a>(&'a self, visit: &mut impl FnMut(&'a str, &'a Value)) {
        match self {
            Requires::Equals(key, value) => visit(key, value),
            Requires::All(items) | Requires::One(items) => {
                for item in items {
                    item.visit_value_leaves(visit);
                }
            }
            Requires::Not(item) => item.visit_value_leaves(visit),
            Requires::Present(_) | Requires::Absent(_) => {}
        }
    }
}
