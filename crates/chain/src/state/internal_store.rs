//! Key-value collection interface consumed by the execution core.
//!
//! Durable engines live outside this crate; they only need to provide the
//! four operations below with single-writer semantics. `MemoryStore` is the
//! in-memory implementation used by `LedgerStore` and by tests.
//!
//! ## Journal
//!
//! While a journal is open, every `put`/`delete` records the key's prior
//! value (or its absence). `rollback_journal` replays those records in
//! reverse, `commit_journal` drops them. Cost is proportional to the keys
//! touched, not to the size of the collection.

use std::collections::BTreeMap;
use std::fmt::Debug;

pub trait KvStore<K, V>: Debug {
    fn get(&self, key: &K) -> Option<V>;
    fn put(&mut self, key: K, value: V);
    fn has(&self, key: &K) -> bool;
    fn delete(&mut self, key: &K);
}

/// Ordered in-memory collection. Iteration follows key order.
#[derive(Debug, Clone)]
pub struct MemoryStore<K: Ord, V> {
    entries: BTreeMap<K, V>,
    /// Prior values of touched keys, oldest first. `None` = no journal open.
    journal: Option<Vec<(K, Option<V>)>>,
}

impl<K: Ord, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            journal: None,
        }
    }
}

/// Equality is over the entries only; an open journal is bookkeeping.
impl<K: Ord, V: PartialEq> PartialEq for MemoryStore<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Ord, V: Eq> Eq for MemoryStore<K, V> {}

impl<K: Ord, V> MemoryStore<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// # Panics
    /// If a journal is already open.
    pub fn begin_journal(&mut self) {
        assert!(self.journal.is_none(), "store journal already open");
        self.journal = Some(Vec::new());
    }

    /// Keep every write since `begin_journal`.
    pub fn commit_journal(&mut self) {
        self.journal = None;
    }

    /// Undo every write since `begin_journal`. No-op without an open journal.
    pub fn rollback_journal(&mut self) {
        let Some(records) = self.journal.take() else {
            return;
        };
        for (key, prior) in records.into_iter().rev() {
            match prior {
                Some(value) => {
                    self.entries.insert(key, value);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    pub fn journal_len(&self) -> usize {
        self.journal.as_ref().map_or(0, Vec::len)
    }
}

impl<K, V> KvStore<K, V> for MemoryStore<K, V>
where
    K: Ord + Clone + Debug,
    V: Clone + Debug,
{
    fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: K, value: V) {
        let prior = self.entries.insert(key.clone(), value);
        if let Some(journal) = self.journal.as_mut() {
            journal.push((key, prior));
        }
    }

    fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn delete(&mut self, key: &K) {
        let prior = self.entries.remove(key);
        if let Some(journal) = self.journal.as_mut() {
            journal.push((key.clone(), prior));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_put_has_delete() {
        let mut store: MemoryStore<String, u64> = MemoryStore::new();
        assert!(!store.has(&"a".to_string()));
        store.put("a".to_string(), 7);
        assert_eq!(store.get(&"a".to_string()), Some(7));
        assert!(store.has(&"a".to_string()));
        assert_eq!(store.len(), 1);
        store.delete(&"a".to_string());
        assert!(store.get(&"a".to_string()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn rollback_restores_overwritten_inserted_and_deleted_keys() {
        let mut store: MemoryStore<u8, u64> = MemoryStore::new();
        store.put(1, 10);
        store.put(2, 20);
        let before = store.clone();

        store.begin_journal();
        store.put(1, 11);
        store.put(1, 12);
        store.delete(&2);
        store.put(3, 30);
        assert_eq!(store.journal_len(), 4);

        store.rollback_journal();
        assert_eq!(store, before);
        assert_eq!(store.get(&1), Some(10));
        assert_eq!(store.get(&2), Some(20));
        assert!(!store.has(&3));
        assert_eq!(store.journal_len(), 0);
    }

    #[test]
    fn commit_keeps_writes_and_stops_recording() {
        let mut store: MemoryStore<u8, u64> = MemoryStore::new();
        store.begin_journal();
        store.put(1, 10);
        store.commit_journal();

        store.put(2, 20);
        assert_eq!(store.journal_len(), 0);
        store.rollback_journal();
        assert_eq!(store.get(&1), Some(10));
        assert_eq!(store.get(&2), Some(20));
    }

    #[test]
    #[should_panic(expected = "already open")]
    fn nested_journal_panics() {
        let mut store: MemoryStore<u8, u64> = MemoryStore::new();
        store.begin_journal();
        store.begin_journal();
    }
}
