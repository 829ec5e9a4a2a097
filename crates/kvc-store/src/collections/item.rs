use std::sync::Arc;

use kvc_codec::{Object, StoreCodec};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// Key label reported for an unset item.
const ITEM_KEY: &str = "<item>";

/// A single value stored at the one-byte key `[prefix]`.
pub struct Item<V> {
    store: Arc<dyn KvStore>,
    codec: StoreCodec,
    prefix: u8,
    name: &'static str,
    _marker: std::marker::PhantomData<fn() -> V>,
}

impl<V: Object + Default> Item<V> {
    pub fn new(store: Arc<dyn KvStore>, codec: StoreCodec, prefix: u8, name: &'static str) -> Self {
        Self {
            store,
            codec,
            prefix,
            name,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the value. Returns `Ok(None)` if it was never set.
    pub fn get(&self) -> StoreResult<Option<V>> {
        match self.store.get(&[self.prefix])? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read the value, failing with [`StoreError::NotFound`] if unset.
    pub fn get_or_err(&self) -> StoreResult<V> {
        self.get()?.ok_or_else(|| StoreError::NotFound {
            collection: self.name,
            key: ITEM_KEY.to_string(),
        })
    }

    /// Read the value, falling back to `V::default()` if unset.
    pub fn get_or_default(&self) -> StoreResult<V> {
        Ok(self.get()?.unwrap_or_default())
    }

    pub fn set(&self, value: &V) -> StoreResult<()> {
        let bytes = self.codec.marshal(value)?;
        self.store.set(&[self.prefix], &bytes)?;
        debug!(
            collection = self.name,
            type_name = self.codec.type_name(value),
            len = bytes.len(),
            "item set"
        );
        Ok(())
    }

    pub fn exists(&self) -> StoreResult<bool> {
        self.store.has(&[self.prefix])
    }

    /// Clear the value. Returns `true` if it was set.
    pub fn remove(&self) -> StoreResult<bool> {
        self.store.delete(&[self.prefix])
    }
}

impl<V> std::fmt::Debug for Item<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .finish()
    }
}
