use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::type_url::TypeUrl;

/// Number of value bytes shown by [`Any`]'s `Debug` output.
const DEBUG_PREVIEW_LEN: usize = 16;

/// Wire envelope for a polymorphic value: a type URL plus the concrete
/// variant's own encoding.
///
/// The type URL is kept as a raw string on the wire. A URL that does not
/// parse must still decode, so that resolution can report it by name.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Any {
    /// `/` + canonical message name of the concrete variant.
    pub type_url: String,
    /// Encoded bytes of the concrete variant.
    pub value: Vec<u8>,
}

impl Any {
    /// Wrap already-encoded variant bytes.
    pub fn new(type_url: &TypeUrl, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.as_str().to_string(),
            value,
        }
    }

    /// Validate and return the embedded type URL.
    pub fn parsed_type_url(&self) -> Result<TypeUrl, TypeError> {
        TypeUrl::parse(&self.type_url)
    }

    /// Hex preview of the first bytes of the value.
    pub fn value_preview(&self) -> String {
        let end = self.value.len().min(DEBUG_PREVIEW_LEN);
        let mut out = hex::encode(&self.value[..end]);
        if self.value.len() > DEBUG_PREVIEW_LEN {
            out.push_str("..");
        }
        out
    }
}

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Any")
            .field("type_url", &self.type_url)
            .field("value", &self.value_preview())
            .field("len", &self.value.len())
            .finish()
    }
}
