use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory, `BTreeMap`-based key-value store.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock` for
/// safe concurrent access and copied on read and write.
pub struct InMemoryKvStore {
    entries: RwLock<Entries>,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn read_entries(&self) -> StoreResult<RwLockReadGuard<'_, Entries>> {
        self.entries
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write_entries(&self) -> StoreResult<RwLockWriteGuard<'_, Entries>> {
        self.entries
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_entries()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_entries()?.is_empty())
    }

    /// Total bytes across all stored values.
    pub fn total_value_bytes(&self) -> StoreResult<u64> {
        Ok(self
            .read_entries()?
            .values()
            .map(|v| v.len() as u64)
            .sum())
    }

    /// Remove all entries.
    pub fn clear(&self) -> StoreResult<()> {
        self.write_entries()?.clear();
        Ok(())
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Smallest key strictly greater than every key starting with `prefix`, or
/// `None` when no such key exists (empty or all-`0xff` prefix).
fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

impl KvStore for InMemoryKvStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.write_entries()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.write_entries()?.remove(key).is_some())
    }

    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.read_entries()?.contains_key(key))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let entries = self.read_entries()?;
        let upper = match prefix_end(prefix) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        Ok(entries
            .range((Bound::Included(prefix.to_vec()), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("InMemoryKvStore")
            .field("key_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn set_and_get() {
        let store = InMemoryKvStore::new();
        store.set(b"k", b"value").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"value".to_vec()));
    }

    #[test]
    fn set_overwrites() {
        let store = InMemoryKvStore::new();
        store.set(b"k", b"one").unwrap();
        store.set(b"k", b"two").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn empty_value_is_distinct_from_missing() {
        let store = InMemoryKvStore::new();
        store.set(b"present", b"").unwrap();
        assert_eq!(store.get(b"present").unwrap(), Some(Vec::new()));
        assert!(store.has(b"present").unwrap());
        assert_eq!(store.get(b"absent").unwrap(), None);
        assert!(!store.has(b"absent").unwrap());
    }

    #[test]
    fn delete_reports_presence() {
        let store = InMemoryKvStore::new();
        store.set(b"k", b"v").unwrap();
        assert!(store.delete(b"k").unwrap());
        assert!(!store.delete(b"k").unwrap());
        assert!(store.get(b"k").unwrap().is_none());
    }

    // -----------------------------------------------------------------------
    // Prefix scans
    // -----------------------------------------------------------------------

    #[test]
    fn scan_prefix_is_ordered_and_bounded() {
        let store = InMemoryKvStore::new();
        store.set(&[1, 3], b"c").unwrap();
        store.set(&[1, 1], b"a").unwrap();
        store.set(&[1, 2], b"b").unwrap();
        store.set(&[2, 0], b"other").unwrap();
        store.set(&[0, 9], b"before").unwrap();

        let entries = store.scan_prefix(&[1]).unwrap();
        let keys: Vec<Vec<u8>> = entries.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![vec![1, 1], vec![1, 2], vec![1, 3]]);
    }

    #[test]
    fn scan_prefix_handles_max_byte() {
        let store = InMemoryKvStore::new();
        store.set(&[0xff, 0x00], b"a").unwrap();
        store.set(&[0xff, 0xff], b"b").unwrap();
        store.set(&[0xfe], b"c").unwrap();
        assert_eq!(store.scan_prefix(&[0xff]).unwrap().len(), 2);
    }

    #[test]
    fn scan_empty_prefix_returns_everything() {
        let store = InMemoryKvStore::new();
        store.set(b"a", b"1").unwrap();
        store.set(b"b", b"2").unwrap();
        assert_eq!(store.scan_prefix(b"").unwrap().len(), 2);
    }

    #[test]
    fn prefix_end_values() {
        assert_eq!(prefix_end(&[1, 2]), Some(vec![1, 3]));
        assert_eq!(prefix_end(&[1, 0xff]), Some(vec![2]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
        assert_eq!(prefix_end(&[]), None);
    }

    // -----------------------------------------------------------------------
    // Batch / utility
    // -----------------------------------------------------------------------

    #[test]
    fn get_batch_with_missing() {
        let store = InMemoryKvStore::new();
        store.set(b"a", b"1").unwrap();
        let results = store.get_batch(&[b"a".as_slice(), b"z".as_slice()]).unwrap();
        assert_eq!(results, vec![Some(b"1".to_vec()), None]);
    }

    #[test]
    fn total_value_bytes_and_clear() {
        let store = InMemoryKvStore::new();
        store.set(b"a", b"12345").unwrap();
        store.set(b"b", b"123456789").unwrap();
        assert_eq!(store.total_value_bytes().unwrap(), 14);
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryKvStore::new());
        store.set(b"shared", b"data").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    assert_eq!(store.get(b"shared").unwrap(), Some(b"data".to_vec()));
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryKvStore::default();
        store.set(b"x", b"y").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryKvStore"));
        assert!(debug.contains("key_count: 1"));
    }
}
