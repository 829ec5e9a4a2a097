use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::registry::Resolver;

/// Type metadata an [`Object`] exposes for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectDescriptor {
    /// Presence-only sentinel with no stored value.
    Presence,
    /// A message with a canonical name.
    Message(&'static str),
    /// No recognizable type metadata.
    Opaque,
}

/// A value that can marshal itself to bytes and populate itself from bytes.
///
/// Implementations must satisfy:
/// - `marshal` is deterministic: logically equal values produce identical
///   bytes on every call.
/// - `unmarshal` either fully populates the receiver or leaves it untouched.
/// - `unpack_interfaces` runs once, after a successful `unmarshal`, and
///   resolves every polymorphic slot reachable from the receiver.
pub trait Object: Send + Sync {
    /// Encode the object.
    fn marshal(&self) -> CodecResult<Vec<u8>>;

    /// Populate the object from bytes produced by [`marshal`](Self::marshal).
    fn unmarshal(&mut self, bytes: &[u8]) -> CodecResult<()>;

    /// Resolve polymorphic slots after a raw decode.
    fn unpack_interfaces(&mut self, _resolver: &Resolver<'_>) -> CodecResult<()> {
        Ok(())
    }

    /// Type metadata used by [`type_name`](crate::type_name).
    fn descriptor(&self) -> ObjectDescriptor {
        ObjectDescriptor::Opaque
    }
}

/// A serde-encoded object with a stable canonical name.
///
/// Every `Message` is an [`Object`] whose wire format is fixed-width
/// little-endian bincode. Encoding is deterministic as long as the type
/// itself is: use `Vec` or `BTreeMap`, never `HashMap`, for collections.
pub trait Message: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Canonical message name, e.g. `bank.v1.Coin`. Used as the type URL
    /// suffix and as the diagnostic type name. Must never change once values
    /// are persisted.
    const NAME: &'static str;

    /// Resolve the polymorphic slots embedded in this message.
    ///
    /// There is no default: every message states its slots, so a slot can
    /// never be skipped by omission. Slot-free messages return `Ok(())`;
    /// others delegate each slot field to
    /// [`ResolveSlots`](crate::ResolveSlots).
    ///
    /// ```compile_fail
    /// use kvc_codec::Message;
    ///
    /// #[derive(serde::Serialize, serde::Deserialize)]
    /// struct Silent {
    ///     n: u64,
    /// }
    ///
    /// impl Message for Silent {
    ///     const NAME: &'static str = "test.v1.Silent";
    /// }
    /// ```
    fn resolve_slots(&mut self, resolver: &Resolver<'_>) -> CodecResult<()>;
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

impl<M: Message> Object for M {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        wire_options()
            .serialize(self)
            .map_err(|e| CodecError::EncodingFailure {
                type_name: M::NAME,
                reason: e.to_string(),
            })
    }

    fn unmarshal(&mut self, bytes: &[u8]) -> CodecResult<()> {
        let decoded: M =
            wire_options()
                .deserialize(bytes)
                .map_err(|e| CodecError::DecodingFailure {
                    type_name: M::NAME,
                    reason: e.to_string(),
                })?;
        *self = decoded;
        Ok(())
    }

    fn unpack_interfaces(&mut self, resolver: &Resolver<'_>) -> CodecResult<()> {
        self.resolve_slots(resolver)
    }

    fn descriptor(&self) -> ObjectDescriptor {
        ObjectDescriptor::Message(M::NAME)
    }
}
