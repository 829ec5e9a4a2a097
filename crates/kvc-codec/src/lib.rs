//! State codec for KVC.
//!
//! This crate turns domain objects into opaque store values and back. It
//! covers the protocol around encoding rather than the byte format itself:
//! when an object's own encoding runs, how failures surface, how
//! polymorphic fields are resolved on decode, and how presence-only keys are
//! represented.
//!
//! # Components
//!
//! - [`Object`] -- capability to marshal to and unmarshal from bytes;
//!   [`Message`] provides it for serde types with a canonical name
//! - [`NoValue`] -- presence-only sentinel whose encoding is always empty
//! - [`InterfaceRegistry`] / [`Resolver`] -- maps type URLs of polymorphic
//!   slots ([`Polymorphic`]) to concrete variant constructors
//! - [`StoreCodec`] -- marshal, unmarshal + resolve, and [`type_name`]
//!
//! # Design Rules
//!
//! 1. Unmarshal always decodes first, then resolves; a caller never observes
//!    a partially decoded or partially resolved object.
//! 2. The registry is built once at startup and is immutable afterwards.
//! 3. Every [`CodecError`] is an integrity failure and is never retried.
//! 4. [`type_name`] never fails.

pub mod codec;
pub mod config;
pub mod error;
pub mod no_value;
pub mod object;
pub mod registry;
pub mod slot;

pub use codec::{type_name, StoreCodec, NO_VALUE_TYPE_NAME, UNKNOWN_TYPE_NAME};
pub use config::CodecConfig;
pub use error::{CodecError, CodecResult, ConfigError, ErrorKind, RegistrationError};
pub use no_value::NoValue;
pub use object::{Message, Object, ObjectDescriptor};
pub use registry::{
    Implements, Interface, InterfaceRegistry, InterfaceRegistryBuilder, Resolver, Variant,
};
pub use slot::{Polymorphic, ResolveSlots};

pub use kvc_types::{Any, TypeUrl};
