//! Arbitration request model.

use crate::Severity;
use serde::{Deserialize, Serialize};

/// Ephemeral request passed to the resource arbiter per action.
///
/// Built by the executor from the action about to run; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Name of the requesting agent
    pub agent_name: String,

    /// Host resource the action will use
    pub resource: ResourceKind,

    /// How urgent the request is
    pub priority: Priority,
}

/// Host resources an action can contend for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// CPU-bound work
    Cpu,
    /// Network-bound work
    Network,
    /// Disk-bound work
    Disk,
    /// Anything else running in the background
    BackgroundProcess,
}

impl ResourceKind {
    /// Infer the resource from an operation name's namespace prefix.
    ///
    /// `monitor`/`tuner` operations stress the CPU, `security`/`updates`
    /// the network, `cleanup` the disk; anything else (including raw
    /// commands, which carry no operation name) is a background process.
    pub fn for_operation(operation: Option<&str>) -> Self {
        let Some(operation) = operation else {
            return Self::BackgroundProcess;
        };
        match operation.split('.').next().unwrap_or("") {
            "monitor" | "tuner" => Self::Cpu,
            "security" | "updates" => Self::Network,
            "cleanup" => Self::Disk,
            _ => Self::BackgroundProcess,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cpu => "cpu",
            Self::Network => "network",
            Self::Disk => "disk",
            Self::BackgroundProcess => "background_process",
        };
        f.write_str(s)
    }
}

/// Urgency of an arbitration request, derived from action severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Routine background maintenance
    Background,
    /// Work the user is likely waiting on
    UserInteraction,
    /// Safety-relevant; bypasses resource caps
    Critical,
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Self::Critical,
            Severity::High | Severity::Medium => Self::UserInteraction,
            Severity::Low | Severity::Info => Self::Background,
        }
    }
}
