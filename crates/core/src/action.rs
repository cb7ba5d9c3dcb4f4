//! Action model - one unit of work an agent can perform.

use serde::{Deserialize, Serialize};

/// One unit of work an agent can perform.
///
/// Exactly one of `operation` / `command` is expected to be set. Actions
/// with neither fail deterministically at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier within the agent
    pub id: String,

    /// Short human-readable name
    pub name: String,

    /// What this action does
    pub description: String,

    /// How dangerous this action is; governs whether it may auto-run
    pub severity: Severity,

    /// Named operation handler to dispatch to (e.g. `monitor.check_cpu`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Raw command to execute instead of a named operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments for the raw command
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Action {
    /// Create an action dispatching to a named operation handler.
    pub fn operation(id: &str, name: &str, operation: &str, severity: Severity) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            severity,
            operation: Some(operation.to_string()),
            command: None,
            args: Vec::new(),
        }
    }

    /// Create an action running a raw command.
    pub fn command(id: &str, name: &str, command: &str, args: &[&str], severity: Severity) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            severity,
            operation: None,
            command: Some(command.to_string()),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the description.
    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Severity of an action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Read-only, informational
    #[default]
    Info,
    /// Low-impact change
    Low,
    /// Noticeable change
    Medium,
    /// Significant change
    High,
    /// Destructive; never auto-executed
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_operation_action_builder() {
        let action = Action::operation("check-cpu", "Check CPU", "monitor.check_cpu", Severity::Info)
            .describe("Sample CPU utilization");
        assert_eq!(action.operation.as_deref(), Some("monitor.check_cpu"));
        assert!(action.command.is_none());
        assert_eq!(action.description, "Sample CPU utilization");
    }

    #[test]
    fn test_command_action_builder() {
        let action = Action::command("uptime", "Uptime", "uptime", &["-p"], Severity::Info);
        assert_eq!(action.command.as_deref(), Some("uptime"));
        assert_eq!(action.args, vec!["-p"]);
        assert!(action.operation.is_none());
    }

    #[test]
    fn test_action_json_omits_unset_target() {
        let action = Action::operation("a", "A", "monitor.check_cpu", Severity::Info);
        let json = serde_json::to_string(&action).unwrap();
        assert!(!json.contains("\"command\""));
        assert!(!json.contains("\"args\""));
    }
}
