//! Resource arbitration - "may resource R be used at priority P right now?"
//!
//! Stateless per call: every decision re-reads live thermal and power
//! telemetry, since both can change between the decision and the act.

#![warn(missing_docs)]

pub mod policy;
pub mod telemetry;

pub use policy::{ArbiterConfig, ResourceArbiter};
pub use telemetry::{PowerProbe, SysfsPowerProbe, SysinfoThermalProbe, ThermalProbe};
