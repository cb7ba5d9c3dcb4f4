//! Background scheduling loop and the on-demand run path.

use crate::executor::ActionExecutor;
use crate::notify::Notifier;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use warden_agents::AgentRegistry;
use warden_core::{ActionResult, AgentConfig, AgentId, AgentStatus};

/// Tunables for the scheduling loop.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// How often the poll loop wakes up
    pub poll_interval: Duration,

    /// How long `stop` waits for the worker to finish cleanly
    pub stop_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

/// Callback invoked once per executed action. Errors are logged and never
/// abort the agent's remaining actions.
pub type ResultCallback = Arc<dyn Fn(&AgentId, &ActionResult) -> Result<(), anyhow::Error> + Send + Sync>;

struct Ctx {
    registry: Arc<AgentRegistry>,
    executor: Arc<ActionExecutor>,
    notifier: Arc<dyn Notifier>,
    on_result: Option<ResultCallback>,
}

struct Worker {
    handle: tokio::task::JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

/// Owns the single background polling loop.
///
/// Each tick asks the registry which enabled agents are due on their
/// interval triggers and runs the due agents' full action lists through the
/// executor. The foreground [`AgentScheduler::run_agent_now`] path shares
/// the same execution core and gates, bypassing only the due check.
pub struct AgentScheduler {
    ctx: Arc<Ctx>,
    config: SchedulerConfig,
    worker: Mutex<Option<Worker>>,
}

impl AgentScheduler {
    /// Create a scheduler over `registry` and `executor`.
    pub fn new(
        registry: Arc<AgentRegistry>,
        executor: Arc<ActionExecutor>,
        notifier: Arc<dyn Notifier>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            ctx: Arc::new(Ctx {
                registry,
                executor,
                notifier,
                on_result: None,
            }),
            config,
            worker: Mutex::new(None),
        }
    }

    /// Install a per-result callback. Must be called before `start`.
    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        let ctx = Arc::get_mut(&mut self.ctx)
            .expect("with_result_callback must be called before the scheduler is shared");
        ctx.on_result = Some(callback);
        self
    }

    /// Start the background worker. Idempotent: a second call while the
    /// worker is alive is a no-op.
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if let Some(existing) = worker.as_ref() {
            if !existing.handle.is_finished() {
                debug!("scheduler already running");
                return;
            }
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let ctx = self.ctx.clone();
        let poll_interval = self.config.poll_interval;
        let handle = tokio::spawn(async move {
            info!(interval_secs = poll_interval.as_secs_f64(), "scheduler started");
            loop {
                // Cancellable idle wait: stop() is honored within one poll
                // interval, but never interrupts an action in flight.
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = tokio::time::sleep(poll_interval) => {}
                }
                if *shutdown_rx.borrow() {
                    break;
                }
                tick(&ctx).await;
            }
            info!("scheduler stopped");
        });

        *worker = Some(Worker { handle, shutdown });
    }

    /// Whether the background worker is currently alive.
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .map(|w| !w.handle.is_finished())
            .unwrap_or(false)
    }

    /// Signal the worker to exit and wait a bounded time for it to finish.
    pub async fn stop(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };
        let _ = worker.shutdown.send(true);
        match tokio::time::timeout(self.config.stop_timeout, worker.handle).await {
            Ok(_) => {}
            Err(_) => warn!(
                timeout_secs = self.config.stop_timeout.as_secs(),
                "scheduler worker did not stop in time; detaching"
            ),
        }
    }

    /// Run one poll tick inline (also what the background worker runs).
    pub async fn poll_once(&self) {
        tick(&self.ctx).await;
    }

    /// Run an agent immediately, bypassing the due check but passing
    /// through the same executor gates. Never raises: an unknown id yields
    /// a single failed result.
    pub async fn run_agent_now(&self, id: &AgentId) -> Vec<ActionResult> {
        let Some(agent) = self.ctx.registry.get_agent(id).await else {
            return vec![ActionResult::failure(
                "",
                format!("unknown agent '{id}'"),
            )];
        };
        info!(agent_id = %id, "on-demand run");
        run_agent(&self.ctx, &agent).await
    }
}

/// One poll tick: run every enabled, idle, due agent once.
async fn tick(ctx: &Ctx) {
    let agents = ctx.registry.list_agents().await;
    let now = chrono::Utc::now();

    for agent in agents.iter().filter(|a| a.enabled) {
        let state = ctx.registry.get_state(&agent.agent_id).await;
        match state.status {
            AgentStatus::Idle => {}
            AgentStatus::Running => {
                // Already in flight; re-entrant execution would double-run
                // the action list.
                debug!(agent_id = %agent.agent_id, "skipping agent already running");
                continue;
            }
            // Paused/Error/Disabled are externally-set and not pollable.
            _ => continue,
        }

        // First due interval trigger wins; one run per agent per tick.
        let due = agent
            .triggers
            .iter()
            .filter_map(|t| t.interval_seconds())
            .any(|seconds| match state.last_run {
                None => true,
                Some(last) => (now - last).num_seconds() >= seconds as i64,
            });
        if !due {
            continue;
        }

        debug!(agent_id = %agent.agent_id, name = %agent.name, "agent due");
        run_agent(ctx, agent).await;
    }
}

/// Execute an agent's full action list in declared order, recording every
/// result and restoring the agent to idle afterwards.
async fn run_agent(ctx: &Ctx, agent: &AgentConfig) -> Vec<ActionResult> {
    let id = &agent.agent_id;

    // Work on a snapshot; the write-back below is the only state mutation
    // taken under the registry lock, so a 60s command never blocks other
    // callers.
    let mut state = ctx.registry.get_state(id).await;
    let entry_status = state.status;
    ctx.registry.set_status(id, AgentStatus::Running).await;
    state.status = AgentStatus::Running;

    let mut results = Vec::with_capacity(agent.actions.len());
    for action in &agent.actions {
        let result = ctx.executor.execute_action(agent, action, &mut state).await;
        state.record_action(result.clone());

        if let Some(callback) = &ctx.on_result {
            if let Err(e) = callback(id, &result) {
                warn!(agent_id = %id, error = %e, "result callback failed");
            }
        }
        if let Err(e) = ctx
            .notifier
            .notify(id, &agent.name, &result, &agent.notifications)
            .await
        {
            debug!(agent_id = %id, error = %e, "notification failed");
        }

        results.push(result);
    }

    // An on-demand run of a paused/disabled/errored agent must not quietly
    // promote it back to the pollable set.
    state.status = match entry_status {
        AgentStatus::Idle | AgentStatus::Running => AgentStatus::Idle,
        other => other,
    };
    ctx.registry.put_state(state).await;
    ctx.registry.save().await;
    results
}
