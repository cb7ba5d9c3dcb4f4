//! Operation abstraction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use warden_core::ActionResult;

/// Free-form settings handed to an operation by the owning agent.
pub type Settings = HashMap<String, serde_json::Value>;

/// A named operation an agent action can dispatch to.
///
/// Handlers read the agent's settings and return an [`ActionResult`];
/// failures they cannot express as a result value surface as errors and are
/// converted at the executor boundary. Handlers never see the action they
/// run for - the executor stamps the action id onto the result afterwards.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Dotted operation name (e.g. `monitor.check_cpu`).
    fn name(&self) -> &str;

    /// Get operation description.
    fn description(&self) -> &str;

    /// Execute against the given agent settings.
    async fn execute(&self, settings: &Settings) -> Result<ActionResult, anyhow::Error>;
}

/// Name-to-handler table.
///
/// Adding an operation means adding one table entry; gating logic never
/// changes. The table ships with the built-ins preregistered and stays open
/// for data-driven registration at runtime.
pub struct OperationTable {
    ops: HashMap<String, Arc<dyn Operation>>,
}

impl OperationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            ops: HashMap::new(),
        }
    }

    /// Create a table with all built-in operations registered.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register(Arc::new(crate::builtin::CheckCpu));
        table.register(Arc::new(crate::builtin::CheckMemory));
        table.register(Arc::new(crate::builtin::CheckDisk));
        table.register(Arc::new(crate::builtin::ReviewPorts));
        table.register(Arc::new(crate::builtin::CleanTemp));
        table.register(Arc::new(crate::builtin::TunerRecommend));
        table
    }

    /// Register an operation under its own name.
    pub fn register(&mut self, op: Arc<dyn Operation>) {
        self.ops.insert(op.name().to_string(), op);
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.ops.get(name).cloned()
    }

    /// Names of all registered operations, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ops.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}
