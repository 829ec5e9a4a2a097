use std::fmt;

use kvc_types::{Any, TypeUrl};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CodecError, CodecResult};
use crate::object::{Message, Object};
use crate::registry::{Implements, Interface, Resolver};

/// A field typed by interface `I` rather than by a concrete type.
///
/// On the wire a slot is its [`Any`] envelope. After decoding, the slot is
/// unresolved until the resolver pass constructs the concrete variant; the
/// [`StoreCodec`](crate::StoreCodec) never hands out a value with an
/// unresolved slot.
///
/// Two slots are equal when their envelopes are equal: same type URL and
/// same encoded bytes.
pub struct Polymorphic<I: ?Sized + Interface> {
    any: Any,
    resolved: Option<Box<I>>,
}

impl<I: ?Sized + Interface> Polymorphic<I> {
    /// Pack a concrete variant. The slot is resolved from the start.
    pub fn pack<T: Implements<I>>(value: T) -> CodecResult<Self> {
        let type_url =
            TypeUrl::for_message(<T as Message>::NAME).map_err(|e| CodecError::EncodingFailure {
                type_name: <T as Message>::NAME,
                reason: e.to_string(),
            })?;
        let bytes = value.marshal()?;
        Ok(Self {
            any: Any::new(&type_url, bytes),
            resolved: Some(Box::new(value).into_interface()),
        })
    }

    /// Wrap a raw envelope. The slot stays unresolved until
    /// [`ResolveSlots::resolve_slots`] runs.
    pub fn from_any(any: Any) -> Self {
        Self {
            any,
            resolved: None,
        }
    }

    /// The wire envelope.
    pub fn any(&self) -> &Any {
        &self.any
    }

    /// Type URL of the concrete variant.
    pub fn type_url(&self) -> &str {
        &self.any.type_url
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// The resolved variant.
    pub fn get(&self) -> Option<&I> {
        self.resolved.as_deref()
    }

    /// The resolved variant as concrete type `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.get().and_then(|v| v.as_any().downcast_ref::<T>())
    }

    pub fn into_inner(self) -> Option<Box<I>> {
        self.resolved
    }
}

impl<I: ?Sized + Interface> PartialEq for Polymorphic<I> {
    fn eq(&self, other: &Self) -> bool {
        self.any == other.any
    }
}

impl<I: ?Sized + Interface> Eq for Polymorphic<I> {}

impl<I: ?Sized + Interface> fmt::Debug for Polymorphic<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Polymorphic")
            .field("interface", &I::NAME)
            .field("type_url", &self.any.type_url)
            .field("resolved", &self.resolved)
            .finish()
    }
}

impl<I: ?Sized + Interface> Serialize for Polymorphic<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.any.serialize(serializer)
    }
}

impl<'de, I: ?Sized + Interface> Deserialize<'de> for Polymorphic<I> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Any::deserialize(deserializer).map(Self::from_any)
    }
}

/// Anything holding polymorphic slots that a [`Message`] can delegate its
/// resolver pass to.
pub trait ResolveSlots {
    fn resolve_slots(&mut self, resolver: &Resolver<'_>) -> CodecResult<()>;
}

impl<I: ?Sized + Interface> ResolveSlots for Polymorphic<I> {
    fn resolve_slots(&mut self, resolver: &Resolver<'_>) -> CodecResult<()> {
        self.resolved = Some(resolver.resolve::<I>(&self.any)?);
        Ok(())
    }
}

impl<T: ResolveSlots> ResolveSlots for Option<T> {
    fn resolve_slots(&mut self, resolver: &Resolver<'_>) -> CodecResult<()> {
        match self {
            Some(inner) => inner.resolve_slots(resolver),
            None => Ok(()),
        }
    }
}

impl<T: ResolveSlots> ResolveSlots for Vec<T> {
    fn resolve_slots(&mut self, resolver: &Resolver<'_>) -> CodecResult<()> {
        self.iter_mut().try_for_each(|slot| slot.resolve_slots(resolver))
    }
}
