//! Hostwarden CLI - autonomous host maintenance agents.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use warden_agents::AgentRegistry;
use warden_arbiter::{ArbiterConfig, ResourceArbiter};
use warden_core::{AgentId, AgentStatus};
use warden_runtime::{ActionExecutor, AgentScheduler, SchedulerConfig, WebhookNotifier};
use warden_storage::JsonStore;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Autonomous host maintenance agents", long_about = None)]
struct Cli {
    /// Data directory for the agent catalog
    #[arg(long, default_value = ".hostwarden")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List agents
    List,
    /// Show one agent's config and state
    Show {
        /// Agent id
        id: String,
    },
    /// Enable an agent
    Enable {
        /// Agent id
        id: String,
    },
    /// Disable an agent
    Disable {
        /// Agent id
        id: String,
    },
    /// Run an agent's actions now, bypassing its triggers
    Run {
        /// Agent id
        id: String,
    },
    /// Run the background scheduler until interrupted
    Start {
        /// Poll interval in seconds
        #[arg(long, default_value = "10")]
        poll_secs: u64,
    },
    /// Show recent activity across all agents
    Activity {
        /// Maximum entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show catalog summary
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = Arc::new(JsonStore::new(&cli.data_dir).await?);
    let registry = Arc::new(AgentRegistry::open(store).await);

    match cli.command {
        Commands::List => {
            let agents = registry.list_agents().await;
            println!("Agents ({})", agents.len());
            for agent in agents {
                let state = registry.get_state(&agent.agent_id).await;
                println!(
                    "  {} | {} | {} | runs {} | {}",
                    agent.agent_id,
                    if agent.enabled { "enabled " } else { "disabled" },
                    format_status(state.status),
                    state.run_count,
                    agent.name,
                );
            }
        }
        Commands::Show { id } => {
            let id = AgentId::from(id);
            let Some(agent) = registry.get_agent(&id).await else {
                println!("Agent not found");
                return Ok(());
            };
            let state = registry.get_state(&id).await;

            println!("Agent: {} ({})", agent.name, agent.agent_id);
            println!("  Kind: {}", agent.kind);
            println!("  Description: {}", agent.description);
            println!("  Enabled: {}", agent.enabled);
            println!("  Dry run: {}", agent.dry_run);
            println!("  Require confirmation: {}", agent.require_confirmation);
            println!("  Max actions/hour: {}", agent.max_actions_per_hour);
            println!("  Status: {}", format_status(state.status));
            println!("  Runs: {} ({} errors)", state.run_count, state.error_count);
            if let Some(last_run) = state.last_run {
                println!("  Last run: {last_run}");
            }
            println!("  Actions:");
            for action in &agent.actions {
                let target = action
                    .operation
                    .clone()
                    .or(action.command.clone())
                    .unwrap_or_else(|| "<none>".to_string());
                println!(
                    "    {} | {} | {} -> {}",
                    action.id, action.severity, action.name, target
                );
            }
        }
        Commands::Enable { id } => {
            let id = AgentId::from(id);
            if registry.enable_agent(&id).await {
                println!("Enabled {id}");
            } else {
                println!("Agent not found");
            }
        }
        Commands::Disable { id } => {
            let id = AgentId::from(id);
            if registry.disable_agent(&id).await {
                println!("Disabled {id}");
            } else {
                println!("Agent not found");
            }
        }
        Commands::Run { id } => {
            let scheduler = build_scheduler(registry, SchedulerConfig::default());
            let results = scheduler.run_agent_now(&AgentId::from(id)).await;
            for result in results {
                println!(
                    "  {} | {} | {}",
                    if result.success { "ok  " } else { "fail" },
                    result.action_id,
                    result.message,
                );
            }
        }
        Commands::Start { poll_secs } => {
            let config = SchedulerConfig {
                poll_interval: std::time::Duration::from_secs(poll_secs),
                ..Default::default()
            };
            let scheduler = build_scheduler(registry, config);
            scheduler.start().await;
            info!("scheduler running; press ctrl-c to stop");
            tokio::signal::ctrl_c().await?;
            scheduler.stop().await;
        }
        Commands::Activity { limit } => {
            let entries = registry.get_recent_activity(limit).await;
            println!("Recent activity ({})", entries.len());
            for entry in entries {
                println!(
                    "  {} | {} | {} | {} | {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.agent_name,
                    entry.result.action_id,
                    if entry.result.success { "ok  " } else { "fail" },
                    entry.result.message,
                );
            }
        }
        Commands::Status => {
            let summary = registry.get_agent_summary().await;
            println!("Agents: {} ({} enabled, {} running)", summary.total, summary.enabled, summary.running);
            println!("Results recorded: {} ({} errors)", summary.total_runs, summary.total_errors);
        }
    }

    Ok(())
}

fn build_scheduler(registry: Arc<AgentRegistry>, config: SchedulerConfig) -> AgentScheduler {
    let arbiter = ResourceArbiter::new(ArbiterConfig::default());
    let executor = Arc::new(ActionExecutor::new(arbiter));
    AgentScheduler::new(registry, executor, Arc::new(WebhookNotifier::new()), config)
}

fn format_status(status: AgentStatus) -> &'static str {
    match status {
        AgentStatus::Idle => "idle",
        AgentStatus::Running => "running",
        AgentStatus::Paused => "paused",
        AgentStatus::Error => "error",
        AgentStatus::Disabled => "disabled",
    }
}
