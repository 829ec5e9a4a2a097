use std::marker::PhantomData;
use std::sync::Arc;

use kvc_codec::{Object, StoreCodec};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::keys::KeyCodec;
use crate::traits::KvStore;

/// Typed map from `K` to `V` stored under a one-byte prefix.
pub struct Map<K, V> {
    store: Arc<dyn KvStore>,
    codec: StoreCodec,
    prefix: u8,
    name: &'static str,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K: KeyCodec, V: Object + Default> Map<K, V> {
    pub fn new(store: Arc<dyn KvStore>, codec: StoreCodec, prefix: u8, name: &'static str) -> Self {
        Self {
            store,
            codec,
            prefix,
            name,
            _marker: PhantomData,
        }
    }

    /// Collection name used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn storage_key(&self, key: &K) -> Vec<u8> {
        let encoded = key.encode_key();
        let mut out = Vec::with_capacity(1 + encoded.len());
        out.push(self.prefix);
        out.extend_from_slice(&encoded);
        out
    }

    fn decode_storage_key(&self, raw: &[u8]) -> StoreResult<K> {
        K::decode_key(&raw[1..]).map_err(|reason| StoreError::InvalidKey {
            collection: self.name,
            reason,
        })
    }

    /// Insert or replace the value at `key`.
    pub fn insert(&self, key: &K, value: &V) -> StoreResult<()> {
        let bytes = self.codec.marshal(value)?;
        self.store.set(&self.storage_key(key), &bytes)?;
        debug!(
            collection = self.name,
            key = %key.stringify(),
            type_name = self.codec.type_name(value),
            len = bytes.len(),
            "collection insert"
        );
        Ok(())
    }

    /// Read the value at `key`. Returns `Ok(None)` if absent.
    pub fn get(&self, key: &K) -> StoreResult<Option<V>> {
        match self.store.get(&self.storage_key(key))? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read the value at `key`, failing with [`StoreError::NotFound`] if absent.
    pub fn get_or_err(&self, key: &K) -> StoreResult<V> {
        self.get(key)?.ok_or_else(|| StoreError::NotFound {
            collection: self.name,
            key: key.stringify(),
        })
    }

    pub fn contains(&self, key: &K) -> StoreResult<bool> {
        self.store.has(&self.storage_key(key))
    }

    /// Remove `key`. Returns `true` if it existed.
    pub fn remove(&self, key: &K) -> StoreResult<bool> {
        let existed = self.store.delete(&self.storage_key(key))?;
        debug!(collection = self.name, key = %key.stringify(), existed, "collection remove");
        Ok(existed)
    }

    /// All entries in ascending key order.
    pub fn iter(&self) -> StoreResult<Vec<(K, V)>> {
        self.iter_raw_prefix(&[])
    }

    /// Entries whose encoded key starts with `key_prefix`, e.g. a
    /// [`pair_prefix`](crate::keys::pair_prefix).
    pub fn iter_raw_prefix(&self, key_prefix: &[u8]) -> StoreResult<Vec<(K, V)>> {
        let mut scan = Vec::with_capacity(1 + key_prefix.len());
        scan.push(self.prefix);
        scan.extend_from_slice(key_prefix);
        self.store
            .scan_prefix(&scan)?
            .into_iter()
            .map(|(raw_key, bytes)| {
                let key = self.decode_storage_key(&raw_key)?;
                let value = self.codec.decode(&bytes)?;
                Ok((key, value))
            })
            .collect()
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> StoreResult<Vec<K>> {
        Ok(self.iter()?.into_iter().map(|(k, _)| k).collect())
    }
}

impl<K, V> std::fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .finish()
    }
}
