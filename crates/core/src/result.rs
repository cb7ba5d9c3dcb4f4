//! Result model - the outcome record of one action execution.

use crate::Time;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of executing one action.
///
/// Policy denials (rate limit, severity, arbitration) are represented as
/// failed results with stable messages, not as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action succeeded
    pub success: bool,

    /// Human-readable outcome message
    pub message: String,

    /// Id of the action that produced this result
    pub action_id: String,

    /// When the result was produced
    pub timestamp: Time,

    /// Optional structured payload. `data["alert"]` is the convention used
    /// by monitoring operations to flag threshold breaches; the core passes
    /// it through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, serde_json::Value>>,
}

impl ActionResult {
    /// Create a successful result.
    pub fn ok(action_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            action_id: action_id.into(),
            timestamp: chrono::Utc::now(),
            data: None,
        }
    }

    /// Create a failed result.
    pub fn failure(action_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            action_id: action_id.into(),
            timestamp: chrono::Utc::now(),
            data: None,
        }
    }

    /// Attach a structured data entry.
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value);
        self
    }

    /// Whether the monitoring alert flag is set in the data payload.
    pub fn is_alert(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|d| d.get("alert"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_result() {
        let result = ActionResult::ok("check-cpu", "CPU at 12%");
        assert!(result.success);
        assert_eq!(result.action_id, "check-cpu");
        assert!(result.data.is_none());
    }

    #[test]
    fn test_alert_flag_passthrough() {
        let result = ActionResult::ok("check-disk", "disk 97% full")
            .with_data("alert", serde_json::json!(true))
            .with_data("usage_percent", serde_json::json!(97.2));
        assert!(result.is_alert());
        assert_eq!(result.data.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_failure_is_not_alert() {
        let result = ActionResult::failure("scan", "deferred by arbitrator");
        assert!(!result.success);
        assert!(!result.is_alert());
    }
}
