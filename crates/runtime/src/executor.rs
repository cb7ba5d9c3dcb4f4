//! Action execution - the safety gates in front of every action.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use warden_arbiter::ResourceArbiter;
use warden_core::{
    Action, ActionResult, AgentConfig, AgentRequest, AgentState, Priority, ResourceKind, Severity,
};
use warden_ops::{CommandRunner, OperationTable, ProcessRunner, DEFAULT_COMMAND_TIMEOUT_SECS};

/// Executes one action for one agent, applying rate-limit, dry-run,
/// severity, and arbitration gates in a fixed order before dispatching.
///
/// Gating is pure: apart from the hour-window reset inside
/// [`AgentState::can_act`], the executor mutates nothing - recording
/// results into state is the scheduler's job, which keeps this logic
/// unit-testable in isolation. Nothing a handler does can propagate an
/// error out of [`ActionExecutor::execute_action`].
pub struct ActionExecutor {
    ops: OperationTable,
    runner: Arc<dyn CommandRunner>,
    arbiter: ResourceArbiter,
    command_timeout: Duration,
}

impl ActionExecutor {
    /// Executor with the built-in operation table and real process runner.
    pub fn new(arbiter: ResourceArbiter) -> Self {
        Self {
            ops: OperationTable::with_builtins(),
            runner: Arc::new(ProcessRunner),
            arbiter,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    /// Replace the operation table.
    pub fn with_ops(mut self, ops: OperationTable) -> Self {
        self.ops = ops;
        self
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Override the raw command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Run one action through the gates. The first failing gate
    /// short-circuits; policy denials come back as failed results with
    /// stable messages, never as errors.
    pub async fn execute_action(
        &self,
        agent: &AgentConfig,
        action: &Action,
        state: &mut AgentState,
    ) -> ActionResult {
        // 1. Rate limit (also rolls the hour window forward).
        if !state.can_act(agent.max_actions_per_hour) {
            debug!(agent = %agent.agent_id, action = %action.id, "rate limited");
            return ActionResult::failure(
                action.id.clone(),
                format!("Rate limit exceeded ({}/hr)", agent.max_actions_per_hour),
            );
        }

        // 2. Dry run: report intent, invoke nothing.
        if agent.dry_run {
            info!(agent = %agent.agent_id, action = %action.name, "dry run");
            return ActionResult::ok(
                action.id.clone(),
                format!("[DRY RUN] {}: {}", action.name, action.description),
            );
        }

        // 3. Severity: critical actions never auto-execute through this
        // path; they must be confirmed through an explicit foreground
        // trigger outside the scheduler.
        if action.severity == Severity::Critical {
            return ActionResult::failure(
                action.id.clone(),
                format!(
                    "Action '{}' requires manual confirmation (severity: critical)",
                    action.name
                ),
            );
        }

        // 4. Arbitration, after the policy gates so denied-by-policy and
        // denied-by-contention stay distinguishable outcomes.
        let request = AgentRequest {
            agent_name: agent.name.clone(),
            resource: ResourceKind::for_operation(action.operation.as_deref()),
            priority: Priority::from(action.severity),
        };
        if !self.arbiter.can_proceed(&request) {
            debug!(agent = %agent.agent_id, action = %action.id, "deferred by arbitrator");
            return ActionResult::failure(action.id.clone(), "deferred by arbitrator")
                .with_data("arbitrator_block", serde_json::json!(true));
        }

        // 5. Dispatch.
        self.dispatch(agent, action).await
    }

    async fn dispatch(&self, agent: &AgentConfig, action: &Action) -> ActionResult {
        if let Some(op_name) = &action.operation {
            let Some(op) = self.ops.get(op_name) else {
                return ActionResult::failure(
                    action.id.clone(),
                    format!("unknown operation '{op_name}'"),
                );
            };
            return match op.execute(&agent.settings).await {
                Ok(mut result) => {
                    result.action_id = action.id.clone();
                    result
                }
                Err(e) => {
                    error!(agent = %agent.agent_id, operation = %op_name, error = %e, "operation failed");
                    ActionResult::failure(action.id.clone(), format!("operation {op_name} failed: {e}"))
                }
            };
        }

        if let Some(command) = &action.command {
            let output = self
                .runner
                .run(command, &action.args, self.command_timeout)
                .await;
            let mut result = if output.success {
                ActionResult::ok(action.id.clone(), output.message)
            } else {
                ActionResult::failure(action.id.clone(), output.message)
            };
            result = result
                .with_data("exit_code", serde_json::json!(output.exit_code))
                .with_data("stdout", serde_json::json!(output.stdout));
            return result;
        }

        ActionResult::failure(
            action.id.clone(),
            format!("Action '{}' has no operation or command", action.name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_arbiter::{ArbiterConfig, PowerProbe, ThermalProbe};
    use warden_core::Trigger;
    use warden_ops::{CommandOutput, Operation, Settings};

    struct FixedThermal(Option<f32>);
    impl ThermalProbe for FixedThermal {
        fn hottest_celsius(&self) -> Option<f32> {
            self.0
        }
    }

    struct FixedPower(bool);
    impl PowerProbe for FixedPower {
        fn on_battery(&self) -> bool {
            self.0
        }
    }

    fn arbiter(hottest: Option<f32>, on_battery: bool) -> ResourceArbiter {
        ResourceArbiter::with_probes(
            ArbiterConfig::default(),
            Box::new(FixedThermal(hottest)),
            Box::new(FixedPower(on_battery)),
        )
    }

    struct CountingOp {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Operation for CountingOp {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "test operation"
        }
        async fn execute(&self, _settings: &Settings) -> Result<ActionResult, anyhow::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ActionResult::ok("", "probe ran"))
        }
    }

    struct FailingOp;

    #[async_trait]
    impl Operation for FailingOp {
        fn name(&self) -> &str {
            "monitor.broken"
        }
        fn description(&self) -> &str {
            "always errors"
        }
        async fn execute(&self, _settings: &Settings) -> Result<ActionResult, anyhow::Error> {
            anyhow::bail!("sensor exploded")
        }
    }

    struct CountingRunner {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandRunner for CountingRunner {
        async fn run(&self, _command: &str, _args: &[String], _timeout: Duration) -> CommandOutput {
            self.calls.fetch_add(1, Ordering::SeqCst);
            CommandOutput {
                success: true,
                message: "ran".to_string(),
                exit_code: 0,
                stdout: "ran\n".to_string(),
            }
        }
    }

    fn test_executor(
        hottest: Option<f32>,
        on_battery: bool,
        op_calls: Arc<AtomicUsize>,
        cmd_calls: Arc<AtomicUsize>,
    ) -> ActionExecutor {
        let mut ops = OperationTable::new();
        ops.register(Arc::new(CountingOp {
            name: "monitor.probe",
            calls: op_calls.clone(),
        }));
        ops.register(Arc::new(CountingOp {
            name: "custom.probe",
            calls: op_calls,
        }));
        ops.register(Arc::new(FailingOp));
        ActionExecutor::new(arbiter(hottest, on_battery))
            .with_ops(ops)
            .with_runner(Arc::new(CountingRunner { calls: cmd_calls }))
    }

    fn agent() -> AgentConfig {
        AgentConfig::new("Test Agent", "monitor", "")
            .with_id("testagnt")
            .with_trigger(Trigger::interval(60))
    }

    fn op_action(severity: Severity) -> Action {
        Action::operation("probe", "Probe", "monitor.probe", severity).describe("probes the host")
    }

    fn fresh_state(agent: &AgentConfig) -> AgentState {
        AgentState::new(agent.agent_id.clone())
    }

    #[tokio::test]
    async fn test_rate_limit_gate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = test_executor(None, false, calls.clone(), Arc::new(AtomicUsize::new(0)));
        let agent = agent().with_max_actions_per_hour(1);
        let mut state = fresh_state(&agent);
        state.record_action(ActionResult::ok("probe", "earlier run"));

        let result = executor
            .execute_action(&agent, &op_action(Severity::Info), &mut state)
            .await;
        assert!(!result.success);
        assert!(result.message.contains("Rate limit exceeded (1/hr)"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_window_reset_allows_action() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = test_executor(None, false, calls.clone(), Arc::new(AtomicUsize::new(0)));
        let agent = agent().with_max_actions_per_hour(1);
        let mut state = fresh_state(&agent);
        state.actions_this_hour = 1;
        state.hour_window_start = chrono::Utc::now() - chrono::Duration::seconds(3601);

        let result = executor
            .execute_action(&agent, &op_action(Severity::Info), &mut state)
            .await;
        assert!(result.success);
        assert_eq!(state.actions_this_hour, 0, "window should have reset");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dry_run_invokes_nothing() {
        let op_calls = Arc::new(AtomicUsize::new(0));
        let cmd_calls = Arc::new(AtomicUsize::new(0));
        let executor = test_executor(None, false, op_calls.clone(), cmd_calls.clone());
        let mut agent = agent();
        agent.dry_run = true;
        let mut state = fresh_state(&agent);

        let result = executor
            .execute_action(&agent, &op_action(Severity::Info), &mut state)
            .await;
        assert!(result.success);
        assert!(result.message.contains("[DRY RUN]"));
        assert!(result.message.contains("Probe"));

        let cmd = Action::command("up", "Uptime", "uptime", &[], Severity::Info);
        let result = executor.execute_action(&agent, &cmd, &mut state).await;
        assert!(result.message.contains("[DRY RUN]"));

        assert_eq!(op_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cmd_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_critical_severity_always_blocked() {
        let calls = Arc::new(AtomicUsize::new(0));
        // Even with ideal telemetry and an empty rate window.
        let executor = test_executor(Some(20.0), false, calls.clone(), Arc::new(AtomicUsize::new(0)));
        let agent = agent();
        let mut state = fresh_state(&agent);

        let result = executor
            .execute_action(&agent, &op_action(Severity::Critical), &mut state)
            .await;
        assert!(!result.success);
        assert!(result.message.contains("manual confirmation"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_arbitration_denial_marks_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        // Hot host: monitor.* infers the cpu resource, Info infers
        // background priority, so arbitration denies.
        let executor = test_executor(Some(95.0), false, calls.clone(), Arc::new(AtomicUsize::new(0)));
        let agent = agent();
        let mut state = fresh_state(&agent);

        let result = executor
            .execute_action(&agent, &op_action(Severity::Info), &mut state)
            .await;
        assert!(!result.success);
        assert_eq!(result.message, "deferred by arbitrator");
        assert_eq!(
            result.data.unwrap()["arbitrator_block"],
            serde_json::json!(true)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_battery_defers_non_monitor_background_op() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = test_executor(None, true, calls.clone(), Arc::new(AtomicUsize::new(0)));
        let agent = agent();
        let mut state = fresh_state(&agent);

        // custom.* infers background_process, denied on battery.
        let action = Action::operation("probe", "Probe", "custom.probe", Severity::Info);
        let result = executor.execute_action(&agent, &action, &mut state).await;
        assert!(!result.success);
        assert_eq!(result.message, "deferred by arbitrator");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_operation_dispatch_stamps_action_id() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = test_executor(None, false, calls.clone(), Arc::new(AtomicUsize::new(0)));
        let agent = agent();
        let mut state = fresh_state(&agent);

        let result = executor
            .execute_action(&agent, &op_action(Severity::Info), &mut state)
            .await;
        assert!(result.success);
        assert_eq!(result.action_id, "probe");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failed_result() {
        let executor = test_executor(
            None,
            false,
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        );
        let agent = agent();
        let mut state = fresh_state(&agent);

        let action = Action::operation("broken", "Broken", "monitor.broken", Severity::Info);
        let result = executor.execute_action(&agent, &action, &mut state).await;
        assert!(!result.success);
        assert!(result.message.contains("sensor exploded"));
    }

    #[tokio::test]
    async fn test_unknown_operation_fails() {
        let executor = test_executor(
            None,
            false,
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        );
        let agent = agent();
        let mut state = fresh_state(&agent);

        let action = Action::operation("x", "X", "monitor.no_such_op", Severity::Info);
        let result = executor.execute_action(&agent, &action, &mut state).await;
        assert!(!result.success);
        assert!(result.message.contains("unknown operation"));
    }

    #[tokio::test]
    async fn test_command_dispatch() {
        let cmd_calls = Arc::new(AtomicUsize::new(0));
        let executor = test_executor(
            None,
            false,
            Arc::new(AtomicUsize::new(0)),
            cmd_calls.clone(),
        );
        let agent = agent();
        let mut state = fresh_state(&agent);

        let action = Action::command("up", "Uptime", "uptime", &["-p"], Severity::Info);
        let result = executor.execute_action(&agent, &action, &mut state).await;
        assert!(result.success);
        assert_eq!(result.data.unwrap()["exit_code"], serde_json::json!(0));
        assert_eq!(cmd_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_action_with_no_target_fails() {
        let executor = test_executor(
            None,
            false,
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        );
        let agent = agent();
        let mut state = fresh_state(&agent);

        let action = Action {
            id: "empty".to_string(),
            name: "Empty".to_string(),
            description: String::new(),
            severity: Severity::Info,
            operation: None,
            command: None,
            args: Vec::new(),
        };
        let result = executor.execute_action(&agent, &action, &mut state).await;
        assert!(!result.success);
        assert!(result.message.contains("has no operation or command"));
    }
}
