//! Typed views over key prefixes of a [`KvStore`](crate::KvStore).
//!
//! - [`Map`] -- key → value
//! - [`KeySet`] -- set of keys, each stored with an empty [`NoValue`](kvc_codec::NoValue)
//! - [`Item`] -- a single value at a fixed key
//!
//! Every collection owns a one-byte namespace prefix; two collections over
//! the same store must use different prefixes.

pub mod item;
pub mod key_set;
pub mod map;

pub use item::Item;
pub use key_set::KeySet;
pub use map::Map;
