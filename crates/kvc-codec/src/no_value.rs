use std::fmt;

use tracing::error;

use crate::error::{CodecError, CodecResult};
use crate::object::{Object, ObjectDescriptor};

/// Longest prefix of offending bytes included in a contract violation.
const PREVIEW_LEN: usize = 8;

/// Presence-only value for keys that carry no payload.
///
/// `NoValue` always encodes to the empty byte string. Decoding anything else
/// into it means the call site paired a presence-only key with a real value,
/// which is a programming error and reported as
/// [`CodecError::ContractViolation`].
///
/// `NoValue` has nothing to display. Its `Display` impl fails, so
/// `to_string()` panics; `Debug` is available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NoValue;

impl Object for NoValue {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn unmarshal(&mut self, bytes: &[u8]) -> CodecResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let shown = &bytes[..bytes.len().min(PREVIEW_LEN)];
        error!(
            len = bytes.len(),
            preview = %hex::encode(shown),
            "non-empty bytes unmarshaled into a no-value object"
        );
        Err(CodecError::ContractViolation(format!(
            "no-value object unmarshaled from {} non-empty bytes ({}{})",
            bytes.len(),
            hex::encode(shown),
            if bytes.len() > PREVIEW_LEN { ".." } else { "" },
        )))
    }

    fn descriptor(&self) -> ObjectDescriptor {
        ObjectDescriptor::Presence
    }
}

impl fmt::Display for NoValue {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error!("attempted to render a no-value object");
        Err(fmt::Error)
    }
}
