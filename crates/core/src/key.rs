//! Store key naming
//!
//! Every set the search layer touches lives under the `idx:` prefix:
//! posting sets are `idx:<term>` and result sets are `idx:<uuid>`.
//! Operand names (terms or result set identifiers) are always passed
//! unprefixed and mapped through [`SetKey::for_name`] right before a
//! command is built.

use std::fmt;
use uuid::Uuid;

/// Prefix shared by posting sets and result sets
pub const INDEX_PREFIX: &str = "idx:";

/// Fully-qualified key of a set in the store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetKey(String);

impl SetKey {
    /// Key for an operand name (a term or a result set identifier)
    pub fn for_name(name: &str) -> Self {
        SetKey(format!("{}{}", INDEX_PREFIX, name))
    }

    /// The full key string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The operand name, if this key carries the index prefix
    pub fn name(&self) -> Option<&str> {
        self.0.strip_prefix(INDEX_PREFIX)
    }
}

impl fmt::Display for SetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a TTL-bound result set
///
/// Generated from a random v4 UUID, so two evaluations never share a
/// destination key. The identifier is an operand name: pass it (not its key)
/// to further set operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResultSetId(String);

impl ResultSetId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        ResultSetId(Uuid::new_v4().to_string())
    }

    /// The bare identifier, usable as an operand name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The store key holding this result set
    pub fn key(&self) -> SetKey {
        SetKey::for_name(&self.0)
    }
}

impl fmt::Display for ResultSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResultSetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
