//! Agent runtime - safety-gated execution and background scheduling.
//!
//! The executor is the single choke point every action passes through
//! before it can touch the real system; the scheduler drives periodic
//! execution and the on-demand "run now" path.

#![warn(missing_docs)]

pub mod executor;
pub mod notify;
pub mod scheduler;

pub use executor::ActionExecutor;
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use scheduler::{AgentScheduler, ResultCallback, SchedulerConfig};
