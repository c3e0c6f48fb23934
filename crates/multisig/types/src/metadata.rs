//! Content-addressed metadata references

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to published proposal metadata.
///
/// Proposals never carry human-readable text inline, only this reference.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(pub String);

impl ContentRef {
    const PREFIX: &'static str = "b3:";

    /// Derive the reference for `content` (BLAKE3, hex encoded)
    pub fn for_content(content: &[u8]) -> Self {
        Self(format!("{}{}", Self::PREFIX, blake3::hash(content).to_hex()))
    }

    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Whether `content` hashes to this reference
    pub fn verifies(&self, content: &[u8]) -> bool {
        *self == Self::for_content(content)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
