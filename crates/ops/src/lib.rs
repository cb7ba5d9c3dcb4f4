//! Operation handlers and command execution.
//!
//! Named operations are the simple I/O wrappers agents dispatch into
//! (CPU/memory/disk readings, port census, temp sweep); the command runner
//! executes raw commands with a bounded timeout. Safety gating lives in the
//! runtime crate, not here.

#![warn(missing_docs)]

pub mod builtin;
pub mod command;
pub mod r#trait;

pub use builtin::{CheckCpu, CheckDisk, CheckMemory, CleanTemp, ReviewPorts, TunerRecommend};
pub use command::{CommandOutput, CommandRunner, ProcessRunner, DEFAULT_COMMAND_TIMEOUT_SECS};
pub use r#trait::{Operation, OperationTable, Settings};
