// src/services/dedup.rs

//! Append-only store of already-accepted video ids.
//!
//! Seeded from the output sink at startup so restarts never re-accept
//! identifiers a prior run already persisted. Nothing is ever removed.

use std::collections::HashSet;

/// In-memory membership set enforcing dataset-wide id uniqueness.
#[derive(Debug, Default)]
pub struct DedupStore {
    ids: HashSet<String>,
}

impl DedupStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize membership from a prior run's persisted identifiers.
    pub fn seed(&mut self, existing_ids: impl IntoIterator<Item = String>) {
        self.ids.extend(existing_ids);
    }

    /// O(1) average-case membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert an identifier. Returns false if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Number of identifiers seen so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if no identifier has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_ids_are_rejected() {
        let mut store = DedupStore::new();
        store.seed(["a".to_string(), "b".to_string()]);

        assert!(store.contains("a"));
        assert!(!store.insert("b"));
        assert!(store.insert("c"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut store = DedupStore::new();
        assert!(store.insert("x"));
        assert!(!store.insert("x"));
        assert_eq!(store.len(), 1);
    }
}
