use kvc_codec::CodecError;
use thiserror::Error;

/// Errors from store and collection operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A value failed to encode, decode or resolve. Always fatal.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A required key is absent.
    #[error("{collection}: key not found: {key}")]
    NotFound {
        collection: &'static str,
        key: String,
    },

    /// A stored key does not decode into the collection's key type.
    #[error("{collection}: invalid key: {reason}")]
    InvalidKey {
        collection: &'static str,
        reason: String,
    },

    /// The backend failed or is unavailable.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this error wraps a codec integrity failure.
    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Codec(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
