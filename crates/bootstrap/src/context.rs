//! Confirmation and progress callbacks
//!
//! These traits let the engine drive a run without depending on a specific
//! terminal, rendering style, or input device.

use crate::error::CommandError;
use crate::types::{ModuleResult, PackageInfo, RunReport};
use anyhow::Result;
use std::io::Read;

/// Confirmation callback for the pre-run gate
pub trait ConfirmCallback {
    /// Ask whether the run should proceed.
    ///
    /// Returns `true` to continue, `false` to abort with no side effects.
    fn confirm(&mut self) -> Result<bool>;
}

/// Progress callback receiving run events as they happen.
///
/// Default implementations ignore every event, so implementors only
/// override what they render.
pub trait ProgressCallback {
    /// The full package summary view, before confirmation
    fn on_plan(&mut self, packages: &[PackageInfo]) {
        let _ = packages;
    }

    /// A package was dispatched
    fn on_package_start(&mut self, name: &str) {
        let _ = name;
    }

    /// A package finished all of its modules successfully
    fn on_package_solved(&mut self, name: &str) {
        let _ = name;
    }

    /// A package failed and will not be retried
    fn on_package_failed(&mut self, name: &str, error: &CommandError) {
        let _ = (name, error);
    }

    /// A module failed but was marked `allow_error`; the package continues
    fn on_module_error_allowed(&mut self, package: &str, result: &ModuleResult) {
        let _ = (package, result);
    }

    /// A critical package failed; the current pool stops here
    fn on_critical_abort(&mut self, name: &str) {
        let _ = name;
    }

    /// Packages left over after the loop with no way to become ready
    fn on_unresolved(&mut self, names: &[String]) {
        let _ = names;
    }

    /// The status log could not be persisted; the run result is unaffected
    fn on_log_write_failed(&mut self, message: &str) {
        let _ = message;
    }

    /// Final aggregate counts for the main pool
    fn on_report(&mut self, report: &RunReport) {
        let _ = report;
    }
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {}

/// Auto-confirm callback (always proceeds)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always aborts)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self) -> Result<bool> {
        Ok(false)
    }
}

/// Single-character y/N confirmation read from an input stream.
///
/// Skips non-alphanumeric bytes (stray newlines from earlier input), then
/// accepts only `y`/`Y`. End of input counts as a decline.
pub struct ReadConfirm<R> {
    input: R,
}

impl<R: Read> ReadConfirm<R> {
    /// Wrap an input stream
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: Read> ConfirmCallback for ReadConfirm<R> {
    fn confirm(&mut self) -> Result<bool> {
        let mut byte = [0u8; 1];
        loop {
            if self.input.read(&mut byte)? == 0 {
                return Ok(false);
            }
            let c = byte[0] as char;
            if c.is_ascii_alphanumeric() {
                return Ok(c == 'y' || c == 'Y');
            }
        }
    }
}
