//! Core types for the bootstrap engine

use serde::{Deserialize, Serialize};

/// Outcome state of a single module run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleState {
    /// The module's process exited with code zero
    Success,
    /// The module's process exited with a non-zero code
    Error,
}

impl ModuleState {
    /// Check if the state represents success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of running a single module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleResult {
    /// Success/error classification of the process exit
    pub state: ModuleState,
    /// Captured stdout lines in arrival order, empty when capture was off
    pub output: Vec<String>,
    /// The fully-expanded invocation, for diagnostics and log messages
    pub command: String,
    /// Variables contributed back to the owning package's store
    pub exported_variables: Vec<(String, String)>,
}

impl ModuleResult {
    /// Create a result with no captured output and no exported variables
    pub fn new(state: ModuleState, command: impl Into<String>) -> Self {
        Self {
            state,
            output: Vec::new(),
            command: command.into(),
            exported_variables: Vec::new(),
        }
    }

    /// Attach captured output lines
    pub fn with_output(mut self, output: Vec<String>) -> Self {
        self.output = output;
        self
    }

    /// Attach exported variables
    pub fn with_variables(mut self, variables: Vec<(String, String)>) -> Self {
        self.exported_variables = variables;
        self
    }

    /// Check if the module succeeded
    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }
}

/// One row of the pre-run package summary view.
///
/// The engine exposes this for every package in the main pool (including
/// previously-run ones); rendering is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name
    pub name: String,
    /// Optional description, informational only
    pub description: Option<String>,
    /// Number of modules the package will run
    pub module_count: usize,
    /// Whether a failure of this package halts the whole run
    pub critical: bool,
    /// Whether the package was already completed in a previous run
    pub previously_run: bool,
}

/// Aggregate outcome of a full bootstrap run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Packages skipped because a previous run completed them
    pub previously_run: usize,
    /// Packages that ran successfully this time
    pub solved: usize,
    /// Packages that ran and failed
    pub failed: usize,
    /// Packages never dispatched (unmet or unresolvable dependencies),
    /// by name, in declaration order
    pub unresolved: Vec<String>,
    /// False when the user declined the confirmation gate
    pub confirmed: bool,
    /// True when a critical package failure stopped the run early
    pub aborted_by_critical: bool,
}

impl RunReport {
    /// Whether every package reached a confirmed-good state
    pub fn is_success(&self) -> bool {
        self.confirmed && self.failed == 0 && self.unresolved.is_empty()
    }

    /// Total number of packages accounted for
    pub fn total(&self) -> usize {
        self.previously_run + self.solved + self.failed + self.unresolved.len()
    }
}
