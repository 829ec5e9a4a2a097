use std::fmt;

use kvc_types::TypeError;
use thiserror::Error;

/// Errors from marshaling, unmarshaling and resolving state values.
///
/// State bytes are only ever produced by this codec, so every variant is an
/// integrity failure. Callers must abort the enclosing operation when they
/// see one; none of them is retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The object could not produce bytes.
    #[error("failed to encode {type_name}: {reason}")]
    EncodingFailure {
        type_name: &'static str,
        reason: String,
    },

    /// Raw bytes did not parse into the target's expected shape.
    #[error("failed to decode {type_name}: {reason}")]
    DecodingFailure {
        type_name: &'static str,
        reason: String,
    },

    /// A polymorphic slot names a type URL with no registered implementation.
    #[error("no implementation registered for type URL {type_url:?} against interface {interface}")]
    UnknownVariant {
        type_url: String,
        interface: &'static str,
    },

    /// A presence-only sentinel was misused at the call site.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl CodecError {
    /// The error kind, for matching without destructuring.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EncodingFailure { .. } => ErrorKind::EncodingFailure,
            Self::DecodingFailure { .. } => ErrorKind::DecodingFailure,
            Self::UnknownVariant { .. } => ErrorKind::UnknownVariant,
            Self::ContractViolation(_) => ErrorKind::ContractViolation,
        }
    }

    /// Whether the enclosing operation must abort. Always `true`: state
    /// bytes have a single producer, so there is nothing to retry.
    pub fn is_fatal(&self) -> bool {
        true
    }

    /// The offending type URL, when the error names one.
    pub fn type_url(&self) -> Option<&str> {
        match self {
            Self::UnknownVariant { type_url, .. } => Some(type_url),
            _ => None,
        }
    }
}

/// Discriminant of [`CodecError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EncodingFailure,
    DecodingFailure,
    UnknownVariant,
    ContractViolation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncodingFailure => write!(f, "encoding-failure"),
            Self::DecodingFailure => write!(f, "decoding-failure"),
            Self::UnknownVariant => write!(f, "unknown-variant"),
            Self::ContractViolation => write!(f, "contract-violation"),
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from building an [`InterfaceRegistry`](crate::InterfaceRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// An implementation was bound to an interface that was never declared.
    #[error("interface {0} was not registered")]
    UnknownInterface(&'static str),

    /// The same interface name was declared twice.
    #[error("interface {0} registered twice")]
    DuplicateInterface(&'static str),

    /// The same type URL was bound twice under one interface.
    #[error("type URL {type_url} registered twice for interface {interface}")]
    DuplicateImplementation {
        type_url: String,
        interface: &'static str,
    },

    /// A message name does not form a valid type URL.
    #[error(transparent)]
    InvalidTypeUrl(#[from] TypeError),
}

/// Errors from loading a [`CodecConfig`](crate::CodecConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid codec config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = CodecError::UnknownVariant {
            type_url: "/x.Y".into(),
            interface: "x.Iface",
        };
        assert_eq!(err.kind(), ErrorKind::UnknownVariant);
        assert_eq!(err.type_url(), Some("/x.Y"));

        let err = CodecError::ContractViolation("bad".into());
        assert_eq!(err.kind(), ErrorKind::ContractViolation);
        assert_eq!(err.type_url(), None);
        assert!(err.is_fatal());
    }

    #[test]
    fn display_names_type_url() {
        let err = CodecError::UnknownVariant {
            type_url: "/x.Y".into(),
            interface: "x.Iface",
        };
        let msg = err.to_string();
        assert!(msg.contains("/x.Y"));
        assert!(msg.contains("x.Iface"));
    }

    #[test]
    fn kind_display_is_kebab_case() {
        assert_eq!(ErrorKind::EncodingFailure.to_string(), "encoding-failure");
        assert_eq!(ErrorKind::ContractViolation.to_string(), "contract-violation");
    }
}
