use crate::error::StoreResult;

/// Raw key-value store underneath the typed collections.
///
/// All implementations must satisfy these invariants:
/// - Values are opaque. The store never interprets them.
/// - A value returned by `get` is byte-for-byte the value last `set`.
/// - `scan_prefix` returns entries in ascending key order.
/// - All backend errors are propagated, never silently ignored.
pub trait KvStore: Send + Sync {
    /// Read the value at `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing any previous value.
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Delete `key`. Returns `true` if the key existed.
    fn delete(&self, key: &[u8]) -> StoreResult<bool>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Check whether `key` exists.
    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Read multiple keys in a batch.
    ///
    /// Default implementation calls `get()` for each key.
    fn get_batch(&self, keys: &[&[u8]]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }
}
