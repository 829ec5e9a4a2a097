//! Interface registry and the depth-tracking resolver built on it.
//!
//! An *interface* is a trait object type such as `dyn Shape`. Concrete
//! [`Message`] types are bound to it by type URL at startup. When a decoded
//! value carries a [`Polymorphic`](crate::Polymorphic) slot, the resolver
//! looks the slot's type URL up under the slot's interface, decodes the
//! concrete variant, resolves that variant's own slots, and hands back a
//! `Box<dyn Shape>`.
//!
//! The registry is frozen by [`InterfaceRegistryBuilder::build`] and never
//! mutated afterwards, so one `Arc<InterfaceRegistry>` can be shared by every
//! codec and thread in the process.

use std::any::{Any as StdAny, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use kvc_types::{Any, TypeUrl};
use tracing::{debug, info};

use crate::error::{CodecError, CodecResult, RegistrationError};
use crate::object::{Message, Object};

/// Supertrait of every interface trait.
///
/// Gives resolved trait objects `Debug` and downcasting. Implemented for all
/// sized [`Object`]s, so interface traits only need to list it:
///
/// ```ignore
/// trait Shape: Variant { fn area(&self) -> f64; }
/// ```
pub trait Variant: Object + fmt::Debug + StdAny {
    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn StdAny;
}

impl<T: Object + fmt::Debug + StdAny> Variant for T {
    fn as_any(&self) -> &dyn StdAny {
        self
    }
}

/// Names an interface. Implemented on the trait object type:
///
/// ```ignore
/// impl Interface for dyn Shape { const NAME: &'static str = "geo.v1.Shape"; }
/// ```
pub trait Interface: Variant {
    /// Canonical interface name, used in errors and diagnostics.
    const NAME: &'static str;
}

/// A concrete message that can stand in for interface `I`.
///
/// Usually derived with [`implements!`](crate::implements).
pub trait Implements<I: ?Sized + Interface>: Message + Default + Variant {
    /// Unsize into the interface's trait object.
    fn into_interface(self: Box<Self>) -> Box<I>;
}

/// Implement [`Implements`] for a list of concrete types.
///
/// ```ignore
/// kvc_codec::implements!(dyn Shape => Circle, Square);
/// ```
#[macro_export]
macro_rules! implements {
    ($iface:ty => $($variant:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$iface> for $variant {
                fn into_interface(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<$iface> {
                    self
                }
            }
        )+
    };
}

type Constructor<I: ?Sized> = fn(&[u8], &Resolver<'_>) -> CodecResult<Box<I>>;

fn construct<I, T>(bytes: &[u8], resolver: &Resolver<'_>) -> CodecResult<Box<I>>
where
    I: ?Sized + Interface,
    T: Implements<I>,
{
    let mut value = T::default();
    value.unmarshal(bytes)?;
    value.unpack_interfaces(resolver)?;
    Ok(Box::new(value).into_interface())
}

/// One (interface, type URL) binding.
struct Binding {
    interface: &'static str,
    type_url: TypeUrl,
    /// A `Constructor<I>` for the binding's interface `I`.
    constructor: Box<dyn StdAny + Send + Sync>,
}

// ---------------------------------------------------------------------------
// InterfaceRegistryBuilder
// ---------------------------------------------------------------------------

/// Collects interface and implementation registrations.
///
/// Registration errors are deferred: the first one is returned by
/// [`build`](Self::build) so that startup code can chain calls.
#[derive(Default)]
pub struct InterfaceRegistryBuilder {
    interfaces: BTreeMap<&'static str, TypeId>,
    bindings: HashMap<(TypeId, String), Binding>,
    errors: Vec<RegistrationError>,
}

impl InterfaceRegistryBuilder {
    /// Start an empty registration table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare interface `I`.
    pub fn register_interface<I: ?Sized + Interface>(mut self) -> Self {
        if self.interfaces.insert(I::NAME, TypeId::of::<I>()).is_some() {
            self.errors.push(RegistrationError::DuplicateInterface(I::NAME));
        }
        self
    }

    /// Bind concrete type `T` to interface `I` under `T`'s type URL.
    pub fn register_implementation<I, T>(mut self) -> Self
    where
        I: ?Sized + Interface,
        T: Implements<I>,
    {
        if self.interfaces.get(I::NAME) != Some(&TypeId::of::<I>()) {
            self.errors.push(RegistrationError::UnknownInterface(I::NAME));
            return self;
        }
        let type_url = match TypeUrl::for_message(T::NAME) {
            Ok(url) => url,
            Err(e) => {
                self.errors.push(e.into());
                return self;
            }
        };
        let key = (TypeId::of::<I>(), type_url.as_str().to_string());
        if self.bindings.contains_key(&key) {
            self.errors.push(RegistrationError::DuplicateImplementation {
                type_url: type_url.to_string(),
                interface: I::NAME,
            });
            return self;
        }
        let constructor: Constructor<I> = construct::<I, T>;
        self.bindings.insert(
            key,
            Binding {
                interface: I::NAME,
                type_url,
                constructor: Box::new(constructor),
            },
        );
        self
    }

    /// Freeze the table.
    pub fn build(mut self) -> Result<InterfaceRegistry, RegistrationError> {
        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }
        info!(
            interfaces = self.interfaces.len(),
            implementations = self.bindings.len(),
            "interface registry built"
        );
        Ok(InterfaceRegistry {
            interfaces: self.interfaces,
            bindings: self.bindings,
        })
    }
}

// ---------------------------------------------------------------------------
// InterfaceRegistry
// ---------------------------------------------------------------------------

/// Immutable table of interface implementations.
pub struct InterfaceRegistry {
    interfaces: BTreeMap<&'static str, TypeId>,
    bindings: HashMap<(TypeId, String), Binding>,
}

impl InterfaceRegistry {
    /// Start a new registration table.
    pub fn builder() -> InterfaceRegistryBuilder {
        InterfaceRegistryBuilder::new()
    }

    /// A registry with no interfaces. Suitable for stores holding no
    /// polymorphic values.
    pub fn empty() -> Self {
        Self {
            interfaces: BTreeMap::new(),
            bindings: HashMap::new(),
        }
    }

    /// Declared interface names, sorted.
    pub fn interfaces(&self) -> Vec<&'static str> {
        self.interfaces.keys().copied().collect()
    }

    /// Type URLs bound to the named interface, sorted.
    pub fn implementations(&self, interface: &str) -> Vec<&TypeUrl> {
        let mut urls: Vec<&TypeUrl> = self
            .bindings
            .values()
            .filter(|b| b.interface == interface)
            .map(|b| &b.type_url)
            .collect();
        urls.sort();
        urls
    }

    /// Whether any interface has an implementation under `type_url`.
    pub fn is_registered(&self, type_url: &str) -> bool {
        self.bindings.values().any(|b| b.type_url.as_str() == type_url)
    }

    fn constructor<I: ?Sized + Interface>(&self, type_url: &str) -> CodecResult<Constructor<I>> {
        let unknown = || CodecError::UnknownVariant {
            type_url: type_url.to_string(),
            interface: I::NAME,
        };
        let binding = self
            .bindings
            .get(&(TypeId::of::<I>(), type_url.to_string()))
            .ok_or_else(unknown)?;
        binding
            .constructor
            .downcast_ref::<Constructor<I>>()
            .copied()
            .ok_or_else(unknown)
    }
}

impl fmt::Debug for InterfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceRegistry")
            .field("interfaces", &self.interfaces.keys().collect::<Vec<_>>())
            .field("implementation_count", &self.bindings.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Read-only view over an [`InterfaceRegistry`] that tracks slot nesting.
///
/// Each resolved variant gets a resolver one level deeper. Nesting beyond
/// `max_depth` is a decoding failure.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a InterfaceRegistry,
    depth: usize,
    max_depth: usize,
}

impl<'a> Resolver<'a> {
    /// A top-level resolver.
    pub fn new(registry: &'a InterfaceRegistry, max_depth: usize) -> Self {
        Self {
            registry,
            depth: 0,
            max_depth,
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &'a InterfaceRegistry {
        self.registry
    }

    /// Current nesting depth (0 for the top-level object).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run the resolver pass over a freshly decoded object.
    pub fn unpack<O: Object + ?Sized>(&self, object: &mut O) -> CodecResult<()> {
        object.unpack_interfaces(self)
    }

    /// Construct the concrete variant named by `any` as interface `I`.
    ///
    /// The variant is decoded and its own slots resolved before this returns.
    pub fn resolve<I: ?Sized + Interface>(&self, any: &Any) -> CodecResult<Box<I>> {
        let constructor = self.registry.constructor::<I>(&any.type_url)?;
        if self.depth >= self.max_depth {
            return Err(CodecError::DecodingFailure {
                type_name: I::NAME,
                reason: format!(
                    "polymorphic nesting exceeds {} levels at {}",
                    self.max_depth, any.type_url
                ),
            });
        }
        debug!(
            interface = I::NAME,
            type_url = %any.type_url,
            depth = self.depth,
            "resolving polymorphic slot"
        );
        let nested = Self {
            depth: self.depth + 1,
            ..*self
        };
        constructor(&any.value, &nested)
    }
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("depth", &self.depth)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
