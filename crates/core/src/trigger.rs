//! Trigger model - conditions that cause an agent's actions to run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A condition that can cause an agent's actions to run.
///
/// The background scheduler only acts on `Interval` triggers; the other
/// kinds are recognized and persisted but fired by external callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    /// What kind of condition this is
    pub kind: TriggerKind,

    /// Kind-specific parameters (`seconds` for Interval)
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// Kinds of triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fires every `seconds` seconds (driven by the poll loop)
    Interval,
    /// Fired by an external event source
    Event,
    /// Fired when an external metric crosses a threshold
    Threshold,
    /// Fired by an external calendar/cron source
    Schedule,
    /// Fired only by an explicit user request
    Manual,
}

impl Trigger {
    /// Create an interval trigger firing every `seconds` seconds.
    pub fn interval(seconds: u64) -> Self {
        let mut params = HashMap::new();
        params.insert("seconds".to_string(), serde_json::json!(seconds));
        Self {
            kind: TriggerKind::Interval,
            params,
        }
    }

    /// Create a manual trigger.
    pub fn manual() -> Self {
        Self {
            kind: TriggerKind::Manual,
            params: HashMap::new(),
        }
    }

    /// The interval in seconds, if this is an interval trigger with a valid
    /// `seconds` param.
    pub fn interval_seconds(&self) -> Option<u64> {
        if self.kind != TriggerKind::Interval {
            return None;
        }
        self.params.get("seconds").and_then(|v| v.as_u64())
    }
}
