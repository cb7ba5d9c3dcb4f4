//! Hostwarden core data models.
//!
//! This crate defines the value types shared by every other crate: agent
//! identities, triggers, actions, execution results, per-agent configuration
//! and runtime state, and the arbitration request passed to the resource
//! arbiter. No scheduling or gating logic lives here.

#![warn(missing_docs)]

mod id;

mod action;
mod config;
mod request;
mod result;
mod state;
mod trigger;

pub use id::AgentId;

pub use action::{Action, Severity};
pub use config::{AgentConfig, NotificationConfig, DEFAULT_MAX_ACTIONS_PER_HOUR};
pub use request::{AgentRequest, Priority, ResourceKind};
pub use result::ActionResult;
pub use state::{AgentState, AgentStatus, MAX_HISTORY};
pub use trigger::{Trigger, TriggerKind};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
