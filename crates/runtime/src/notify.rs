//! Notification collaborators.
//!
//! Delivery is best-effort by contract: the scheduler swallows every error
//! these return, so a broken webhook can never break scheduling.

use async_trait::async_trait;
use tracing::info;
use warden_core::{ActionResult, AgentId, NotificationConfig};

/// Delivers the outcome of one action to the outside world.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `result` per the agent's notification config.
    async fn notify(
        &self,
        agent_id: &AgentId,
        agent_name: &str,
        result: &ActionResult,
        config: &NotificationConfig,
    ) -> Result<(), anyhow::Error>;
}

/// Whether this result should be delivered at all under `config`.
pub(crate) fn should_notify(result: &ActionResult, config: &NotificationConfig) -> bool {
    if !config.enabled {
        return false;
    }
    if config.on_failure_only {
        return !result.success || result.is_alert();
    }
    true
}

/// Notifier that writes outcomes to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        agent_id: &AgentId,
        agent_name: &str,
        result: &ActionResult,
        config: &NotificationConfig,
    ) -> Result<(), anyhow::Error> {
        if !should_notify(result, config) {
            return Ok(());
        }
        info!(
            agent_id = %agent_id,
            agent = agent_name,
            action = %result.action_id,
            success = result.success,
            "{}",
            result.message
        );
        Ok(())
    }
}

/// Notifier that POSTs outcomes to the agent's webhook, falling back to the
/// log when no webhook is configured.
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a webhook notifier with its own HTTP client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        agent_id: &AgentId,
        agent_name: &str,
        result: &ActionResult,
        config: &NotificationConfig,
    ) -> Result<(), anyhow::Error> {
        if !should_notify(result, config) {
            return Ok(());
        }
        let Some(url) = &config.webhook_url else {
            return LogNotifier.notify(agent_id, agent_name, result, config).await;
        };
        let payload = serde_json::json!({
            "agent_id": agent_id,
            "agent_name": agent_name,
            "action_id": result.action_id,
            "success": result.success,
            "message": result.message,
            "timestamp": result.timestamp,
            "data": result.data,
        });
        self.client
            .post(url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
