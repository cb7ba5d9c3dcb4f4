//! Runtime state of an agent.

use crate::{ActionResult, AgentId, Time};
use serde::{Deserialize, Serialize};

/// Maximum number of results retained in an agent's history.
pub const MAX_HISTORY: usize = 100;

/// Seconds in the rolling rate-limit window.
const HOUR_WINDOW_SECS: i64 = 3600;

/// Runtime state of one agent.
///
/// Created lazily on first reference, mutated only by the executor (hour
/// window reset inside [`AgentState::can_act`]) and the scheduler (via
/// [`AgentState::record_action`]), persisted alongside the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// The agent this state belongs to
    pub agent_id: AgentId,

    /// Lifecycle status
    pub status: AgentStatus,

    /// When the agent last ran
    pub last_run: Option<Time>,

    /// Result of the most recently executed action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<ActionResult>,

    /// Total results recorded over the agent's lifetime
    pub run_count: u64,

    /// Total failed results recorded
    pub error_count: u64,

    /// Actions recorded in the current hour window
    pub actions_this_hour: u32,

    /// Start of the current hour window
    pub hour_window_start: Time,

    /// Recent results, oldest first, bounded to [`MAX_HISTORY`]
    #[serde(default)]
    pub history: Vec<ActionResult>,
}

/// Lifecycle status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Waiting for a trigger
    Idle,
    /// An action list is currently in flight
    Running,
    /// Suspended by an operator; not pollable
    Paused,
    /// Stopped after a fault; not pollable
    Error,
    /// Turned off; not pollable
    Disabled,
}

impl AgentState {
    /// Create a fresh idle state for `agent_id`.
    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            status: AgentStatus::Idle,
            last_run: None,
            last_result: None,
            run_count: 0,
            error_count: 0,
            actions_this_hour: 0,
            hour_window_start: chrono::Utc::now(),
            history: Vec::new(),
        }
    }

    /// Whether another action fits in the rolling hour budget.
    ///
    /// Resets the window as a side effect once more than an hour has passed
    /// since `hour_window_start`.
    pub fn can_act(&mut self, max_per_hour: u32) -> bool {
        let now = chrono::Utc::now();
        if (now - self.hour_window_start).num_seconds() > HOUR_WINDOW_SECS {
            self.actions_this_hour = 0;
            self.hour_window_start = now;
        }
        self.actions_this_hour < max_per_hour
    }

    /// Record the outcome of one action.
    ///
    /// Bumps the lifetime and hour-window counters, tracks failures, and
    /// appends to the bounded history (oldest entries dropped first).
    pub fn record_action(&mut self, result: ActionResult) {
        self.run_count += 1;
        self.actions_this_hour += 1;
        if !result.success {
            self.error_count += 1;
        }
        self.last_run = Some(result.timestamp);
        self.last_result = Some(result.clone());
        self.history.push(result);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }
}
