//! Generic fact containers

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

/// A set-lattice fact: the partial order is subset inclusion and the
/// meet is union (may-analysis semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFact<T: Clone + Eq + Hash> {
    items: HashSet<T>,
}

impl<T: Clone + Eq + Hash> SetFact<T> {
    /// The empty set; bottom of the lattice.
    pub fn new() -> Self {
        Self {
            items: HashSet::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> bool {
        self.items.insert(item)
    }

    pub fn remove<Q>(&mut self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.remove(item)
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.contains(item)
    }

    /// `self = self ∪ other`; returns whether `self` grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let before = self.items.len();
        self.items.extend(other.items.iter().cloned());
        self.items.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone + Eq + Hash> Default for SetFact<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> FromIterator<T> for SetFact<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set_of(items: &[&str]) -> SetFact<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_union_reports_growth() {
        let mut a = set_of(&["x"]);
        let b = set_of(&["x", "y"]);
        assert!(a.union_with(&b));
        assert!(!a.union_with(&b));
        assert_eq!(a, set_of(&["x", "y"]));
    }

    #[test]
    fn test_remove_then_insert() {
        let mut fact = set_of(&["x", "y"]);
        assert!(fact.remove("x"));
        assert!(!fact.remove("x"));
        assert!(fact.insert("x".to_string()));
        assert_eq!(fact, set_of(&["x", "y"]));
    }

    fn small_set() -> impl Strategy<Value = SetFact<String>> {
        proptest::collection::hash_set("[abcd]", 0..4)
            .prop_map(|items| items.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_union_commutative(a in small_set(), b in small_set()) {
            let mut ab = a.clone();
            ab.union_with(&b);
            let mut ba = b.clone();
            ba.union_with(&a);
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn prop_union_associative(a in small_set(), b in small_set(), c in small_set()) {
            let mut left = a.clone();
            left.union_with(&b);
            left.union_with(&c);
            let mut bc = b.clone();
            bc.union_with(&c);
            let mut right = a.clone();
            right.union_with(&bc);
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_union_idempotent(a in small_set()) {
            let mut aa = a.clone();
            prop_assert!(!aa.union_with(&a));
            prop_assert_eq!(aa, a);
        }
    }
}
