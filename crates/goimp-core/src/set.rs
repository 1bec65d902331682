//! An unordered set of strings.

use std::collections::HashSet;

/// A store of strings without any particular order and no repeated values.
///
/// Iteration order is incidental; callers that need an order sort the
/// exported sequence themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set {
    state: HashSet<String>,
}

impl Set {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, returning true if it was not already present
    pub fn add(&mut self, elem: impl Into<String>) -> bool {
        self.state.insert(elem.into())
    }

    /// Check whether the set contains `elem`
    #[must_use]
    pub fn contains(&self, elem: &str) -> bool {
        self.state.contains(elem)
    }

    /// Add every element of `elems`, returning the set for chaining
    pub fn extend<I, S>(&mut self, elems: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.extend(elems.into_iter().map(Into::into));
        self
    }

    /// A fresh vector of every element, in unspecified order
    #[must_use]
    pub fn export(&self) -> Vec<String> {
        self.state.iter().cloned().collect()
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Returns true if the set has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Iterate over the elements in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.state.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Set {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for Set {
    type Item = String;
    type IntoIter = std::collections::hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.state.into_iter()
    }
}
