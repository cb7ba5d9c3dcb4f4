//! Built-in agent templates.
//!
//! Seeded into every registry at load time for any id not already present,
//! so user edits to a built-in (thresholds, enabled flag) survive restarts.
//! Built-in ids can never be removed, only disabled.

use serde_json::json;
use warden_core::{Action, AgentConfig, AgentId, Severity, Trigger};

/// Fixed ids of the built-in agents.
pub const BUILTIN_AGENT_IDS: [&str; 5] =
    ["sysmon-1", "secrev-1", "upcheck1", "cleanup1", "tunerec1"];

/// Whether `id` belongs to the built-in set.
pub fn is_builtin(id: &AgentId) -> bool {
    BUILTIN_AGENT_IDS.contains(&id.as_str())
}

/// The built-in agent templates, in catalog order.
pub fn builtin_templates() -> Vec<AgentConfig> {
    vec![
        system_monitor(),
        security_review(),
        update_check(),
        temp_cleanup(),
        performance_tuner(),
    ]
}

fn system_monitor() -> AgentConfig {
    AgentConfig::new(
        "System Monitor",
        "monitor",
        "Watches CPU, memory, and disk pressure",
    )
    .with_id("sysmon-1")
    .with_trigger(Trigger::interval(300))
    .with_action(
        Action::operation("check-cpu", "Check CPU", "monitor.check_cpu", Severity::Info)
            .describe("Sample global CPU utilization"),
    )
    .with_action(
        Action::operation(
            "check-memory",
            "Check memory",
            "monitor.check_memory",
            Severity::Info,
        )
        .describe("Sample memory pressure"),
    )
    .with_action(
        Action::operation(
            "check-disk",
            "Check disk",
            "monitor.check_disk",
            Severity::Info,
        )
        .describe("Check filesystem fill levels"),
    )
    .with_setting("cpu_threshold", json!(90.0))
    .with_setting("memory_threshold", json!(90.0))
    .with_setting("disk_threshold", json!(90.0))
}

fn security_review() -> AgentConfig {
    AgentConfig::new(
        "Security Review",
        "security",
        "Periodic census of listening sockets",
    )
    .with_id("secrev-1")
    .with_trigger(Trigger::interval(3600))
    .with_action(
        Action::operation(
            "review-ports",
            "Review ports",
            "security.review_ports",
            Severity::Low,
        )
        .describe("Count listening TCP sockets"),
    )
}

fn update_check() -> AgentConfig {
    AgentConfig::new(
        "Update Check",
        "updates",
        "Counts pending package upgrades",
    )
    .with_id("upcheck1")
    .with_trigger(Trigger::interval(86_400))
    .with_action(
        Action::command(
            "count-upgrades",
            "Count upgrades",
            "sh",
            &["-c", "apt list --upgradable 2>/dev/null | tail -n +2 | wc -l"],
            Severity::Info,
        )
        .describe("Query the package manager for pending upgrades"),
    )
}

fn temp_cleanup() -> AgentConfig {
    AgentConfig::new(
        "Temp Cleanup",
        "cleanup",
        "Sweeps stale files out of temp directories",
    )
    .with_id("cleanup1")
    .with_trigger(Trigger::interval(86_400))
    .with_action(
        Action::operation(
            "clean-temp",
            "Clean temp",
            "cleanup.clean_temp",
            Severity::Medium,
        )
        .describe("Remove temp files older than the configured age"),
    )
    .with_setting("paths", json!(["/tmp"]))
    .with_setting("max_age_days", json!(7))
    .with_max_actions_per_hour(2)
}

fn performance_tuner() -> AgentConfig {
    AgentConfig::new(
        "Performance Tuner",
        "tuner",
        "Recommends tuning when load outgrows the cores",
    )
    .with_id("tunerec1")
    .with_trigger(Trigger::interval(3600))
    .with_action(
        Action::operation(
            "recommend",
            "Recommend tuning",
            "tuner.recommend",
            Severity::Info,
        )
        .describe("Compare load average against core count"),
    )
    .disabled()
}
