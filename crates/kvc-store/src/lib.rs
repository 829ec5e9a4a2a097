//! Store boundary and typed state collections for KVC.
//!
//! Collections sit between module state and a raw byte-keyed store. Keys are
//! encoded with [`KeyCodec`]; values go through a [`StoreCodec`](kvc_codec::StoreCodec),
//! so every read fully decodes and resolves polymorphic fields before the
//! caller sees it.
//!
//! # Collections
//!
//! - [`Map`] -- key to value
//! - [`KeySet`] -- presence-only keys, stored with [`NoValue`](kvc_codec::NoValue)
//! - [`Item`] -- a single value
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKvStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. The store never interprets values.
//! 2. Codec failures surface as [`StoreError::Codec`] and are never retried.
//! 3. Prefix scans return entries in ascending key order.

pub mod collections;
pub mod error;
pub mod keys;
pub mod memory;
pub mod traits;

pub use collections::{Item, KeySet, Map};
pub use error::{StoreError, StoreResult};
pub use keys::{pair_prefix, KeyCodec};
pub use memory::InMemoryKvStore;
pub use traits::KvStore;
