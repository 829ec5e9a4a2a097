//! Foundation types for KVC, the key-value state codec.
//!
//! Every other KVC crate depends on `kvc-types`.
//!
//! # Key Types
//!
//! - [`TypeUrl`] -- Validated identifier of a concrete message type
//! - [`Any`] -- Wire envelope of a polymorphic value (type URL + bytes)
//! - [`TypeError`] -- Validation failures

pub mod any;
pub mod error;
pub mod type_url;

pub use any::Any;
pub use error::TypeError;
pub use type_url::TypeUrl;
