//! Encounter and entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the encounter (scene) being edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterId(String);

impl EncounterId {
    /// Create a new encounter ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EncounterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Positional index of an entity within one encounter.
///
/// Assigned by the store on every creation. Never reuse an index captured
/// before a remove/recreate cycle: the recreated entity lives elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityIndex(pub u32);

impl EntityIndex {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}
