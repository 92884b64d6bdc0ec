//! Ordered sequences without repeats.
//!
//! Resolution works on ordered lists that may accumulate repeats (a schema
//! shared by two systems, a system reached through two schemas). Order is
//! significant downstream, so repeats are removed with a fixed policy: the
//! **last** occurrence of each value is kept, and survivors stay in their
//! original relative order.
//!
//! ```text
//! [x, y, x]    -> [y, x]
//! [a, b, a, c] -> [b, a, c]
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use serde::Serialize;

/// An insertion-ordered sequence holding each value once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UniqueSeq<T> {
    items: Vec<T>,
}

impl<T: Eq + Hash + Clone> UniqueSeq<T> {
    /// Collapse `items`, keeping each value at its last position.
    #[must_use]
    pub fn keep_last<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        let mut seen = HashSet::with_capacity(items.len());
        let mut kept: Vec<T> = Vec::with_capacity(items.len());
        for item in items.into_iter().rev() {
            if seen.insert(item.clone()) {
                kept.push(item);
            }
        }
        kept.reverse();
        Self { items: kept }
    }

    /// Returns `true` if `value` is in the sequence.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }
}

impl<T> UniqueSeq<T> {
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for UniqueSeq<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for UniqueSeq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::keep_last(iter)
    }
}

impl<T> IntoIterator for UniqueSeq<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a UniqueSeq<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_last_occurrence() {
        let seq = UniqueSeq::keep_last(["x", "y", "x"]);
        assert_eq!(seq.as_slice(), &["y", "x"]);
    }

    #[test]
    fn test_keep_last_interleaved() {
        let seq: UniqueSeq<_> = ["a", "b", "a", "c", "b"].into_iter().collect();
        assert_eq!(seq.into_vec(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_no_repeats_unchanged() {
        let seq = UniqueSeq::keep_last(vec![3, 1, 2]);
        assert_eq!(seq.as_slice(), &[3, 1, 2]);
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_empty() {
        let seq: UniqueSeq<String> = UniqueSeq::keep_last(Vec::new());
        assert!(seq.is_empty());
    }
}
