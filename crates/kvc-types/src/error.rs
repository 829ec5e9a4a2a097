use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid type URL {url:?}: {reason}")]
    InvalidTypeUrl { url: String, reason: String },
}
