//! JSON file storage implementation.
//!
//! Stores the agent catalog as two human-inspectable documents in the data
//! directory: `agents.json` (configs) and `states.json` (runtime states,
//! history truncated to the retention bound on write). Both are rewritten
//! wholesale on every save.

use super::{Result, Store};
use std::path::{Path, PathBuf};
use tokio::fs;
use warden_core::{AgentConfig, AgentState, MAX_HISTORY};

/// File-based JSON storage backend.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Create storage rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn agents_path(&self) -> PathBuf {
        self.root.join("agents.json")
    }

    fn states_path(&self) -> PathBuf {
        self.root.join("states.json")
    }
}

#[async_trait::async_trait]
impl Store for JsonStore {
    async fn load_agents(&self) -> Result<Vec<AgentConfig>> {
        Ok(read_json(&self.agents_path()).await?.unwrap_or_default())
    }

    async fn save_agents(&self, agents: &[AgentConfig]) -> Result<()> {
        let json = serde_json::to_string_pretty(agents)?;
        fs::write(self.agents_path(), json.as_bytes()).await?;
        Ok(())
    }

    async fn load_states(&self) -> Result<Vec<AgentState>> {
        Ok(read_json(&self.states_path()).await?.unwrap_or_default())
    }

    async fn save_states(&self, states: &[AgentState]) -> Result<()> {
        // Enforce the history bound on the wire even if a caller handed us
        // an over-long state.
        let mut bounded = states.to_vec();
        for state in &mut bounded {
            if state.history.len() > MAX_HISTORY {
                let excess = state.history.len() - MAX_HISTORY;
                state.history.drain(..excess);
            }
        }
        let json = serde_json::to_string_pretty(&bounded)?;
        fs::write(self.states_path(), json.as_bytes()).await?;
        Ok(())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
