//! Raw command execution with a bounded timeout.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Default ceiling on raw command runtime, in seconds.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Outcome of running one raw command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the command ran and exited zero
    pub success: bool,

    /// Human-readable summary (first stdout line, or the failure reason)
    pub message: String,

    /// Exit code; -1 when the process was killed or never started
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,
}

/// Executes raw commands on behalf of agent actions.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `args`, killing it after `timeout`.
    async fn run(&self, command: &str, args: &[String], timeout: Duration) -> CommandOutput;
}

/// Command runner backed by real host processes.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &str, args: &[String], timeout: Duration) -> CommandOutput {
        debug!(command, ?args, "running command");

        let mut cmd = Command::new(command);
        cmd.args(args).kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return CommandOutput {
                    success: false,
                    message: format!("failed to start: {e}"),
                    exit_code: -1,
                    stdout: String::new(),
                };
            }
            Err(_) => {
                return CommandOutput {
                    success: false,
                    message: format!("timed out after {}s", timeout.as_secs()),
                    exit_code: -1,
                    stdout: String::new(),
                };
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let success = output.status.success();

        let message = if success {
            stdout
                .lines()
                .next()
                .unwrap_or("command completed")
                .to_string()
        } else {
            let reason = stderr.lines().next().unwrap_or("").trim();
            if reason.is_empty() {
                format!("exited with code {exit_code}")
            } else {
                format!("exited with code {exit_code}: {reason}")
            }
        };

        CommandOutput {
            success,
            message,
            exit_code,
            stdout,
        }
    }
}
