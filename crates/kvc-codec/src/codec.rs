use std::sync::Arc;

use tracing::{debug, error};

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult, ConfigError};
use crate::object::{Object, ObjectDescriptor};
use crate::registry::{InterfaceRegistry, Resolver};

/// Diagnostic name of the presence-only sentinel.
pub const NO_VALUE_TYPE_NAME: &str = "no-op-object";

/// Diagnostic name of objects without type metadata.
pub const UNKNOWN_TYPE_NAME: &str = "unknown";

/// Stable diagnostic label for an object's concrete type.
///
/// Never fails. Used as a log field and metrics label, never for control
/// flow.
pub fn type_name<O: Object + ?Sized>(object: &O) -> &'static str {
    match object.descriptor() {
        ObjectDescriptor::Presence => NO_VALUE_TYPE_NAME,
        ObjectDescriptor::Message(name) => name,
        ObjectDescriptor::Opaque => UNKNOWN_TYPE_NAME,
    }
}

/// Marshals objects into store values and back.
///
/// Every codec in a process must share the same [`InterfaceRegistry`];
/// cloning a codec shares it.
///
/// All errors are integrity failures. State bytes are only produced by this
/// codec, so a decode failure means corruption or a missing registration,
/// and an encode failure means the program built an unrepresentable value.
/// Callers propagate them and abort the enclosing operation.
#[derive(Clone, Debug)]
pub struct StoreCodec {
    registry: Arc<InterfaceRegistry>,
    config: CodecConfig,
}

impl StoreCodec {
    /// Create a codec with default limits.
    pub fn new(registry: Arc<InterfaceRegistry>) -> Self {
        Self {
            registry,
            config: CodecConfig::default(),
        }
    }

    /// Create a codec with explicit limits. Rejects a config that fails
    /// [`CodecConfig::validate`].
    pub fn with_config(
        registry: Arc<InterfaceRegistry>,
        config: CodecConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> &Arc<InterfaceRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// A top-level resolver over this codec's registry.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry, self.config.max_resolve_depth)
    }

    /// Encode an object into a store value.
    pub fn marshal<O: Object + ?Sized>(&self, object: &O) -> CodecResult<Vec<u8>> {
        let name = type_name(object);
        let bytes = object.marshal().inspect_err(|e| {
            error!(type_name = name, error = %e, "failed to marshal state value");
        })?;
        if bytes.len() > self.config.max_value_size {
            error!(
                type_name = name,
                len = bytes.len(),
                max = self.config.max_value_size,
                "state value exceeds size limit"
            );
            return Err(CodecError::EncodingFailure {
                type_name: name,
                reason: format!(
                    "encoded size {} exceeds limit {}",
                    bytes.len(),
                    self.config.max_value_size
                ),
            });
        }
        debug!(type_name = name, len = bytes.len(), "marshaled state value");
        Ok(bytes)
    }

    /// Decode a store value into `target` and resolve its polymorphic slots.
    ///
    /// The raw decode runs first, then the resolver pass. Both run on a fresh
    /// value, which replaces `target` only when both succeed; on error
    /// `target` is untouched.
    pub fn unmarshal<O: Object + Default>(&self, bytes: &[u8], target: &mut O) -> CodecResult<()> {
        let name = type_name(target);
        let mut fresh = O::default();
        self.decode_into(bytes, &mut fresh).inspect_err(|e| {
            error!(
                type_name = name,
                kind = %e.kind(),
                error = %e,
                "failed to unmarshal state value"
            );
        })?;
        debug!(type_name = name, len = bytes.len(), "unmarshaled state value");
        *target = fresh;
        Ok(())
    }

    /// Decode a store value into a new object.
    pub fn decode<O: Object + Default>(&self, bytes: &[u8]) -> CodecResult<O> {
        let mut object = O::default();
        self.unmarshal(bytes, &mut object)?;
        Ok(object)
    }

    /// Diagnostic name of `object`'s type. See [`type_name`].
    pub fn type_name<O: Object + ?Sized>(&self, object: &O) -> &'static str {
        type_name(object)
    }

    fn decode_into<O: Object>(&self, bytes: &[u8], object: &mut O) -> CodecResult<()> {
        if bytes.len() > self.config.max_value_size {
            return Err(CodecError::DecodingFailure {
                type_name: type_name(object),
                reason: format!(
                    "value size {} exceeds limit {}",
                    bytes.len(),
                    self.config.max_value_size
                ),
            });
        }
        object.unmarshal(bytes)?;
        self.resolver().unpack(object)
    }
}
