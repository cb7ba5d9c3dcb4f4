//! Agent catalog - configs, runtime states, and built-in templates.
//!
//! The [`AgentRegistry`] is the single source of truth for agent
//! definitions and runtime state within the process, with durable storage
//! behind it. It is an explicit value owned by the process entry point and
//! shared by handle; constructing a fresh instance is the test reset hook.

#![warn(missing_docs)]

pub mod builtin;
pub mod registry;

pub use builtin::{builtin_templates, is_builtin, BUILTIN_AGENT_IDS};
pub use registry::{ActivityEntry, AgentRegistry, AgentSummary};
