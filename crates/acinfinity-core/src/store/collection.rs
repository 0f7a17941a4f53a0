// ── Generic reactive entity collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection keyed by string.
///
/// Uses `DashMap` for O(1) concurrent lookups and `watch` channels for
/// push-based change notification. Subscribers only hear about a
/// replacement that actually changed something.
pub(crate) struct EntityCollection<T: Clone + PartialEq + Send + Sync + 'static> {
    /// Primary storage: entity id -> entity.
    by_key: DashMap<String, Arc<T>>,

    /// Version counter, bumped on every effective mutation.
    version: watch::Sender<u64>,

    /// Full snapshot sorted by key, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the whole collection with `items`.
    ///
    /// Unchanged entries keep their `Arc`, missing keys are pruned.
    /// Returns `true` if anything changed.
    pub(crate) fn replace_all(&self, items: impl IntoIterator<Item = (String, T)>) -> bool {
        let mut changed = false;
        let mut seen = std::collections::HashSet::new();

        for (key, item) in items {
            let differs = self
                .by_key
                .get(&key)
                .is_none_or(|existing| **existing != item);
            if differs {
                self.by_key.insert(key.clone(), Arc::new(item));
                changed = true;
            }
            seen.insert(key);
        }

        let before = self.by_key.len();
        self.by_key.retain(|key, _| seen.contains(key));
        changed |= self.by_key.len() != before;

        if changed {
            self.rebuild_snapshot();
            self.bump_version();
        }
        changed
    }

    /// Look up an entity by its primary key string.
    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Return all current primary keys, sorted.
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_key.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values in key order and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn items(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn replace_all_inserts_new_entries() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.replace_all(items(&[("b", "y"), ("a", "x")])));
        assert_eq!(col.len(), 2);
        assert_eq!(*col.get_by_key("a").unwrap(), "x");
        assert_eq!(col.keys(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn identical_replacement_is_not_a_change() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all(items(&[("a", "x")]));
        let before = col.get_by_key("a").unwrap();
        let version = col.version();

        assert!(!col.replace_all(items(&[("a", "x")])));
        assert_eq!(col.version(), version);
        assert!(Arc::ptr_eq(&before, &col.get_by_key("a").unwrap()));
    }

    #[test]
    fn missing_keys_are_pruned() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all(items(&[("a", "x"), ("b", "y")]));

        assert!(col.replace_all(items(&[("b", "y")])));
        assert!(col.get_by_key("a").is_none());
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn snapshot_is_sorted_by_key() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.snapshot().is_empty());

        col.replace_all(items(&[("c", "3"), ("a", "1"), ("b", "2")]));
        let snap: Vec<String> = col.snapshot().iter().map(|s| (**s).clone()).collect();
        assert_eq!(snap, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let col: EntityCollection<String> = EntityCollection::new();
        let mut rx = col.subscribe();

        col.replace_all(items(&[("a", "x")]));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
