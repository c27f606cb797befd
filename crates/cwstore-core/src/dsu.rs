//! # Disjoint-Set Union
//!
//! Union-find over arbitrary ordered keys, with path halving and union by
//! size. Only used while checking a new cell's boundary.

use std::collections::BTreeMap;

/// A disjoint-set forest keyed by `T`.
#[derive(Debug, Clone)]
pub struct DisjointSet<T: Ord + Copy> {
    slots: BTreeMap<T, usize>,
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl<T: Ord + Copy> Default for DisjointSet<T> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
            parent: Vec::new(),
            size: Vec::new(),
        }
    }
}

impl<T: Ord + Copy> DisjointSet<T> {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forest with one singleton set per element.
    pub fn from_elements(elements: impl IntoIterator<Item = T>) -> Self {
        let mut set = Self::new();
        for element in elements {
            set.insert(element);
        }
        set
    }

    /// Add `element` as a singleton set. No-op if already present.
    pub fn insert(&mut self, element: T) {
        if self.slots.contains_key(&element) {
            return;
        }
        let slot = self.parent.len();
        self.slots.insert(element, slot);
        self.parent.push(slot);
        self.size.push(1);
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// True when the forest holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn root(&mut self, mut slot: usize) -> usize {
        while self.parent[slot] != slot {
            self.parent[slot] = self.parent[self.parent[slot]];
            slot = self.parent[slot];
        }
        slot
    }

    /// Representative slot of the set containing `element`.
    pub fn find(&mut self, element: T) -> Option<usize> {
        let slot = *self.slots.get(&element)?;
        Some(self.root(slot))
    }

    /// Merge the sets of `a` and `b`. Returns false if either is unknown.
    pub fn union(&mut self, a: T, b: T) -> bool {
        let (Some(mut ra), Some(mut rb)) = (self.find(a), self.find(b)) else {
            return false;
        };
        if ra == rb {
            return true;
        }
        if self.size[ra] > self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[ra] = rb;
        self.size[rb] = self.size[rb].saturating_add(self.size[ra]);
        true
    }

    /// True when `a` and `b` are known and in the same set.
    pub fn connected(&mut self, a: T, b: T) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_disconnected() {
        let mut dsu = DisjointSet::from_elements([1, 2, 3]);
        assert_eq!(dsu.len(), 3);
        assert!(!dsu.connected(1, 2));
        assert!(dsu.connected(3, 3));
    }

    #[test]
    fn union_is_transitive() {
        let mut dsu = DisjointSet::from_elements(0..6);
        assert!(dsu.union(0, 1));
        assert!(dsu.union(2, 3));
        assert!(dsu.union(1, 3));
        assert!(dsu.connected(0, 2));
        assert!(!dsu.connected(0, 4));
    }

    #[test]
    fn unknown_elements_are_rejected() {
        let mut dsu = DisjointSet::from_elements(['a', 'b']);
        assert!(!dsu.union('a', 'z'));
        assert_eq!(dsu.find('z'), None);
        assert!(!dsu.connected('a', 'z'));
    }

    #[test]
    fn insert_is_idempotent() {
        let mut dsu = DisjointSet::new();
        dsu.insert(7);
        dsu.insert(7);
        assert_eq!(dsu.len(), 1);
        assert!(!dsu.is_empty());
    }

    #[test]
    fn long_chain_collapses_to_one_root() {
        let mut dsu = DisjointSet::from_elements(0..1000);
        for i in 0..999 {
            dsu.union(i, i + 1);
        }
        let root = dsu.find(0);
        assert!((0..1000).all(|i| dsu.find(i) == root));
    }
}
