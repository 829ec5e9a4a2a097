use std::sync::Arc;

use kvc_codec::{NoValue, StoreCodec};

use crate::collections::map::Map;
use crate::error::StoreResult;
use crate::keys::KeyCodec;
use crate::traits::KvStore;

/// Set of keys. Membership is key presence; each key stores [`NoValue`].
///
/// Reading a member whose stored value is not empty fails with a
/// [`ContractViolation`](kvc_codec::CodecError::ContractViolation): the key
/// space was written by something other than this set.
pub struct KeySet<K> {
    inner: Map<K, NoValue>,
}

impl<K: KeyCodec> KeySet<K> {
    pub fn new(store: Arc<dyn KvStore>, codec: StoreCodec, prefix: u8, name: &'static str) -> Self {
        Self {
            inner: Map::new(store, codec, prefix, name),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Add `key`. Idempotent.
    pub fn insert(&self, key: &K) -> StoreResult<()> {
        self.inner.insert(key, &NoValue)
    }

    /// Whether `key` is a member. Validates the stored marker.
    pub fn contains(&self, key: &K) -> StoreResult<bool> {
        Ok(self.inner.get(key)?.is_some())
    }

    /// Remove `key`. Returns `true` if it was a member.
    pub fn remove(&self, key: &K) -> StoreResult<bool> {
        self.inner.remove(key)
    }

    /// All members in ascending key order.
    pub fn iter(&self) -> StoreResult<Vec<K>> {
        self.inner.keys()
    }

    /// Members whose encoded key starts with `key_prefix`.
    pub fn iter_raw_prefix(&self, key_prefix: &[u8]) -> StoreResult<Vec<K>> {
        Ok(self
            .inner
            .iter_raw_prefix(key_prefix)?
            .into_iter()
            .map(|(k, _)| k)
            .collect())
    }
}

impl<K> std::fmt::Debug for KeySet<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySet").field("inner", &self.inner).finish()
    }
}
