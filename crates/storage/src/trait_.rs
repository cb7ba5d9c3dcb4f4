//! Storage trait abstraction.

use async_trait::async_trait;
use warden_core::{AgentConfig, AgentState};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Storage abstraction for agent configs and runtime states.
///
/// Both collections are read at registry construction and rewritten
/// wholesale on every save. Allows different backends to be plugged in.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load all persisted agent configs. An absent document is empty, not
    /// an error.
    async fn load_agents(&self) -> Result<Vec<AgentConfig>>;

    /// Persist the full config list, replacing the previous document.
    async fn save_agents(&self, agents: &[AgentConfig]) -> Result<()>;

    /// Load all persisted agent states. An absent document is empty, not
    /// an error.
    async fn load_states(&self) -> Result<Vec<AgentState>>;

    /// Persist the full state list, replacing the previous document.
    async fn save_states(&self, states: &[AgentState]) -> Result<()>;
}
