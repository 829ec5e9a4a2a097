use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest encoded value accepted by default (64 MiB).
pub const DEFAULT_MAX_VALUE_SIZE: usize = 64 * 1024 * 1024;

/// Deepest chain of nested polymorphic slots resolved by default.
pub const DEFAULT_MAX_RESOLVE_DEPTH: usize = 32;

/// Limits applied by a [`StoreCodec`](crate::StoreCodec).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum size of a marshaled value, in bytes.
    pub max_value_size: usize,
    /// Maximum nesting of polymorphic slots inside one value.
    pub max_resolve_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            max_resolve_depth: DEFAULT_MAX_RESOLVE_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every value unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_value_size == 0 {
            return Err(ConfigError::Invalid("max_value_size must be positive".into()));
        }
        if self.max_resolve_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_resolve_depth must be positive".into(),
            ));
        }
        Ok(())
    }
}
