//! Agent registry - configs, states, and best-effort persistence.

use crate::builtin::{builtin_templates, is_builtin};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use warden_core::{ActionResult, AgentConfig, AgentId, AgentState, AgentStatus, Time};
use warden_storage::Store;

/// Single source of truth for agent configs and runtime states.
///
/// All mutation goes through one coarse lock; the decision logic in the
/// executor and arbiter stays pure and runs outside it. Persistence is
/// best-effort: a failed save is logged and the in-memory state remains
/// authoritative for the rest of the process.
pub struct AgentRegistry {
    store: Arc<dyn Store>,
    inner: Mutex<Inner>,
}

struct Inner {
    configs: HashMap<AgentId, AgentConfig>,
    states: HashMap<AgentId, AgentState>,
}

impl AgentRegistry {
    /// Load the registry from `store`.
    ///
    /// Load order: persisted configs first, then built-in templates for any
    /// id not already present (user edits to built-ins survive restarts),
    /// then persisted states. Load failures are logged and degrade to the
    /// built-in catalog.
    pub async fn open(store: Arc<dyn Store>) -> Self {
        let mut configs = HashMap::new();

        match store.load_agents().await {
            Ok(persisted) => {
                for cfg in persisted {
                    configs.insert(cfg.agent_id.clone(), cfg);
                }
            }
            Err(e) => warn!(error = %e, "failed to load agents; starting from built-ins"),
        }
        for template in builtin_templates() {
            configs
                .entry(template.agent_id.clone())
                .or_insert(template);
        }

        let mut states = HashMap::new();
        match store.load_states().await {
            Ok(persisted) => {
                for state in persisted {
                    states.insert(state.agent_id.clone(), state);
                }
            }
            Err(e) => warn!(error = %e, "failed to load states; starting fresh"),
        }

        info!(agents = configs.len(), "agent registry loaded");
        Self {
            store,
            inner: Mutex::new(Inner { configs, states }),
        }
    }

    /// All agent configs, sorted by name.
    pub async fn list_agents(&self) -> Vec<AgentConfig> {
        let inner = self.inner.lock().await;
        let mut agents: Vec<AgentConfig> = inner.configs.values().cloned().collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        agents
    }

    /// Look up one agent config.
    pub async fn get_agent(&self, id: &AgentId) -> Option<AgentConfig> {
        self.inner.lock().await.configs.get(id).cloned()
    }

    /// Runtime state for `id`, materializing a fresh idle state on first
    /// access. Never absent.
    pub async fn get_state(&self, id: &AgentId) -> AgentState {
        let mut inner = self.inner.lock().await;
        inner
            .states
            .entry(id.clone())
            .or_insert_with(|| AgentState::new(id.clone()))
            .clone()
    }

    /// Register a new agent.
    ///
    /// Assigns an id if the config arrived without one, initializes state,
    /// and persists the catalog.
    pub async fn register_agent(&self, mut cfg: AgentConfig) -> AgentConfig {
        if cfg.agent_id.is_empty() {
            cfg.agent_id = AgentId::generate();
        }
        {
            let mut inner = self.inner.lock().await;
            let id = cfg.agent_id.clone();
            inner.configs.insert(id.clone(), cfg.clone());
            inner
                .states
                .entry(id.clone())
                .or_insert_with(|| AgentState::new(id));
        }
        info!(agent_id = %cfg.agent_id, name = %cfg.name, "registered agent");
        self.save().await;
        cfg
    }

    /// Remove an agent and its state.
    ///
    /// Built-in agents can never be removed, only disabled; returns false
    /// without mutating in that case, and for unknown ids.
    pub async fn remove_agent(&self, id: &AgentId) -> bool {
        if is_builtin(id) {
            warn!(agent_id = %id, "refusing to remove built-in agent");
            return false;
        }
        let removed = {
            let mut inner = self.inner.lock().await;
            let removed = inner.configs.remove(id).is_some();
            if removed {
                inner.states.remove(id);
            }
            removed
        };
        if removed {
            info!(agent_id = %id, "removed agent");
            self.save().await;
        }
        removed
    }

    /// Enable an agent and return it to Idle. False for unknown ids.
    pub async fn enable_agent(&self, id: &AgentId) -> bool {
        self.set_enabled(id, true).await
    }

    /// Disable an agent. False for unknown ids.
    pub async fn disable_agent(&self, id: &AgentId) -> bool {
        self.set_enabled(id, false).await
    }

    async fn set_enabled(&self, id: &AgentId, enabled: bool) -> bool {
        {
            let mut inner = self.inner.lock().await;
            let Some(cfg) = inner.configs.get_mut(id) else {
                return false;
            };
            cfg.enabled = enabled;
            let status = if enabled {
                AgentStatus::Idle
            } else {
                AgentStatus::Disabled
            };
            inner
                .states
                .entry(id.clone())
                .or_insert_with(|| AgentState::new(id.clone()))
                .status = status;
        }
        info!(agent_id = %id, enabled, "agent toggled");
        self.save().await;
        true
    }

    /// Set the lifecycle status of an agent's state.
    pub async fn set_status(&self, id: &AgentId, status: AgentStatus) {
        let mut inner = self.inner.lock().await;
        inner
            .states
            .entry(id.clone())
            .or_insert_with(|| AgentState::new(id.clone()))
            .status = status;
    }

    /// Write back a state snapshot mutated outside the lock.
    pub async fn put_state(&self, state: AgentState) {
        let mut inner = self.inner.lock().await;
        inner.states.insert(state.agent_id.clone(), state);
    }

    /// Record one action result into an agent's state.
    pub async fn record_action(&self, id: &AgentId, result: ActionResult) {
        let mut inner = self.inner.lock().await;
        inner
            .states
            .entry(id.clone())
            .or_insert_with(|| AgentState::new(id.clone()))
            .record_action(result);
    }

    /// Persist the full catalog. Best-effort: failures are logged, never
    /// surfaced, since losing the last write beats crashing the scheduler.
    pub async fn save(&self) {
        let (configs, states) = {
            let inner = self.inner.lock().await;
            let configs: Vec<AgentConfig> = inner.configs.values().cloned().collect();
            let states: Vec<AgentState> = inner.states.values().cloned().collect();
            (configs, states)
        };
        if let Err(e) = self.store.save_agents(&configs).await {
            warn!(error = %e, "failed to save agents");
        }
        if let Err(e) = self.store.save_states(&states).await {
            warn!(error = %e, "failed to save states");
        }
        debug!(agents = configs.len(), "registry persisted");
    }

    /// Aggregate counts across the catalog.
    pub async fn get_agent_summary(&self) -> AgentSummary {
        let inner = self.inner.lock().await;
        let mut summary = AgentSummary {
            total: inner.configs.len(),
            enabled: inner.configs.values().filter(|c| c.enabled).count(),
            ..Default::default()
        };
        for state in inner.states.values() {
            summary.total_runs += state.run_count;
            summary.total_errors += state.error_count;
            if state.status == AgentStatus::Running {
                summary.running += 1;
            }
        }
        summary
    }

    /// The most recent results across all agents, newest first.
    pub async fn get_recent_activity(&self, limit: usize) -> Vec<ActivityEntry> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<ActivityEntry> = inner
            .states
            .values()
            .flat_map(|state| {
                let name = inner
                    .configs
                    .get(&state.agent_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                state.history.iter().map(move |result| ActivityEntry {
                    agent_id: state.agent_id.clone(),
                    agent_name: name.clone(),
                    timestamp: result.timestamp,
                    result: result.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        entries
    }
}

/// Aggregate view over the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct AgentSummary {
    /// Number of registered agents
    pub total: usize,
    /// How many are enabled
    pub enabled: usize,
    /// How many are currently running
    pub running: usize,
    /// Results recorded across all agents
    pub total_runs: u64,
    /// Failed results recorded across all agents
    pub total_errors: u64,
}

/// One entry of recent activity.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    /// Agent that produced the result
    pub agent_id: AgentId,
    /// Its display name at read time
    pub agent_name: String,
    /// When the result was produced
    pub timestamp: Time,
    /// The result itself
    pub result: ActionResult,
}
