//! Unique identifiers for hostwarden agents.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for an agent.
///
/// Eight lowercase characters. Generated ids take the random tail of a fresh
/// ULID so that two agents created in the same millisecond still differ;
/// built-in agents use fixed, human-readable ids instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Number of characters in a generated id.
    pub const LEN: usize = 8;

    /// Generate a new random AgentId.
    pub fn generate() -> Self {
        let ulid = Ulid::new().to_string();
        Self(ulid[ulid.len() - Self::LEN..].to_ascii_lowercase())
    }

    /// View the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty (unassigned).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::generate()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_length() {
        let id = AgentId::generate();
        assert_eq!(id.as_str().len(), AgentId::LEN);
        assert_eq!(id.as_str(), id.as_str().to_ascii_lowercase());
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = AgentId::generate();
        let b = AgentId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_str_roundtrip() {
        let id = AgentId::from("sysmon-1");
        assert_eq!(id.to_string(), "sysmon-1");
        assert!(!id.is_empty());
    }
}
