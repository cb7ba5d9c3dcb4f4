//! Agent configuration model.

use crate::{Action, AgentId, Time, Trigger};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default ceiling on actions per rolling hour window.
pub const DEFAULT_MAX_ACTIONS_PER_HOUR: u32 = 10;

fn default_max_actions_per_hour() -> u32 {
    DEFAULT_MAX_ACTIONS_PER_HOUR
}

/// Configuration of one agent.
///
/// Created at registration, mutated by enable/disable and settings updates,
/// never deleted for built-in agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique identifier; immutable after creation
    pub agent_id: AgentId,

    /// Human-readable name
    pub name: String,

    /// Category of agent (e.g. `monitor`, `security`, `cleanup`)
    pub kind: String,

    /// What this agent is for
    pub description: String,

    /// Whether the scheduler considers this agent at all
    pub enabled: bool,

    /// Conditions that cause the action list to run
    #[serde(default)]
    pub triggers: Vec<Trigger>,

    /// Ordered list of actions; executed strictly in declared order
    #[serde(default)]
    pub actions: Vec<Action>,

    /// Free-form settings handed to operation handlers
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,

    /// Whether a human must confirm before any action runs
    #[serde(default)]
    pub require_confirmation: bool,

    /// Ceiling on actions per rolling hour window
    #[serde(default = "default_max_actions_per_hour")]
    pub max_actions_per_hour: u32,

    /// Report intended actions without invoking anything real
    #[serde(default)]
    pub dry_run: bool,

    /// When the agent was registered
    pub created_at: Time,

    /// How outcomes are delivered
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Event topics this agent subscribes to (fired by external callers)
    #[serde(default)]
    pub subscriptions: Vec<String>,
}

impl AgentConfig {
    /// Create a new agent config with a freshly generated id.
    pub fn new(name: &str, kind: &str, description: &str) -> Self {
        Self {
            agent_id: AgentId::generate(),
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            enabled: true,
            triggers: Vec::new(),
            actions: Vec::new(),
            settings: HashMap::new(),
            require_confirmation: false,
            max_actions_per_hour: DEFAULT_MAX_ACTIONS_PER_HOUR,
            dry_run: false,
            created_at: chrono::Utc::now(),
            notifications: NotificationConfig::default(),
            subscriptions: Vec::new(),
        }
    }

    /// Use a fixed id (built-in agents).
    pub fn with_id(mut self, id: &str) -> Self {
        self.agent_id = AgentId::from(id);
        self
    }

    /// Add a trigger.
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Append an action to the ordered list.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Set a handler setting.
    pub fn with_setting(mut self, key: &str, value: serde_json::Value) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }

    /// Cap the actions-per-hour budget.
    pub fn with_max_actions_per_hour(mut self, max: u32) -> Self {
        self.max_actions_per_hour = max;
        self
    }

    /// Start disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// How an agent's outcomes are delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether to deliver notifications at all
    pub enabled: bool,

    /// Only notify on failures and alerts
    pub on_failure_only: bool,

    /// Optional webhook endpoint; when unset, delivery is log-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on_failure_only: true,
            webhook_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn test_new_config_defaults() {
        let cfg = AgentConfig::new("System Monitor", "monitor", "Watches host vitals");
        assert!(cfg.enabled);
        assert!(!cfg.dry_run);
        assert_eq!(cfg.max_actions_per_hour, DEFAULT_MAX_ACTIONS_PER_HOUR);
        assert_eq!(cfg.agent_id.as_str().len(), AgentId::LEN);
    }

    #[test]
    fn test_builder_chain() {
        let cfg = AgentConfig::new("Cleanup", "cleanup", "")
            .with_id("cleanup1")
            .with_trigger(Trigger::interval(86_400))
            .with_action(Action::operation("sweep", "Sweep temp", "cleanup.clean_temp", Severity::Medium))
            .with_setting("max_age_days", serde_json::json!(7))
            .with_max_actions_per_hour(2)
            .disabled();
        assert_eq!(cfg.agent_id.as_str(), "cleanup1");
        assert_eq!(cfg.triggers.len(), 1);
        assert_eq!(cfg.actions.len(), 1);
        assert_eq!(cfg.max_actions_per_hour, 2);
        assert!(!cfg.enabled);
    }

    #[test]
    fn test_max_actions_defaults_when_missing_in_json() {
        let json = serde_json::json!({
            "agent_id": "sysmon-1",
            "name": "System Monitor",
            "kind": "monitor",
            "description": "",
            "enabled": true,
            "created_at": chrono::Utc::now(),
        });
        let cfg: AgentConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.max_actions_per_hour, DEFAULT_MAX_ACTIONS_PER_HOUR);
        assert!(cfg.triggers.is_empty());
        assert!(cfg.notifications.enabled);
    }
}
