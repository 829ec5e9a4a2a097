use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Identifier of a concrete message type inside an [`Any`](crate::Any) envelope.
///
/// A type URL is `/` followed by the canonical message name, e.g.
/// `/bank.v1.Coin`. The name is restricted to ASCII alphanumerics, `.` and
/// `_` so it can be used verbatim as a log field and metrics label.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeUrl(String);

impl TypeUrl {
    /// Build the type URL for a canonical message name.
    pub fn for_message(name: &str) -> Result<Self, TypeError> {
        Self::parse(&format!("/{name}"))
    }

    /// Parse and validate a type URL.
    pub fn parse(url: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidTypeUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };
        let name = url.strip_prefix('/').ok_or_else(|| invalid("missing leading '/'"))?;
        if name.is_empty() {
            return Err(invalid("empty message name"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '_'))
        {
            return Err(invalid(&format!("illegal character {c:?}")));
        }
        if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return Err(invalid("empty path segment"));
        }
        Ok(Self(url.to_string()))
    }

    /// The full URL including the leading slash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical message name (the URL without its leading slash).
    pub fn message_name(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Debug for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeUrl({})", self.0)
    }
}

impl fmt::Display for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TypeUrl {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TypeUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for TypeUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TypeUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
