//! Error types for the bootstrap engine.
//!
//! Structural errors (validation, unsolvable dependency graphs) abort before
//! any module runs. Runtime errors are caught at the package boundary and
//! only stop the whole run through the explicit critical-package signal.

use thiserror::Error;

/// A module reported failure and was not marked `allow_error`.
///
/// Carries the fully-expanded command for diagnostics and whatever output
/// was captured before the module gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    /// The fully-expanded invocation that failed
    pub command: String,
    /// Captured output lines, empty if capture was not requested
    pub output: Vec<String>,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "command failed: {}", self.command)?;
        if !self.output.is_empty() {
            write!(f, "\n{}", self.output.join("\n"))?;
        }
        Ok(())
    }
}

/// Errors that can occur while preparing or driving a bootstrap run.
#[derive(Debug, Error)]
pub enum Error {
    /// A `requires` entry names a package that does not exist in the pool
    #[error("the following requirements are listed but do not exist: {}", missing.join(", "))]
    Validation {
        /// Required names with no matching package
        missing: Vec<String>,
    },

    /// Two packages share the same name
    #[error("duplicate package name: {name}")]
    DuplicateName {
        /// The name declared more than once
        name: String,
    },

    /// The dependency graph cannot be fully resolved (cycle or dead end)
    #[error("the package combination cannot be solved, stuck on: {}", stuck.join(", "))]
    Unsolvable {
        /// Packages that can never become ready
        stuck: Vec<String>,
    },

    /// A package handle does not exist in the storage
    #[error("the package '{name}' does not exist in the storage")]
    PackageNotFound {
        /// Name of the missing package
        name: String,
    },

    /// Attempted to mark a package that is not in the `Ready` state
    #[error("the package '{name}' is not ready and cannot be marked; it is currently '{state}'")]
    InvalidTransition {
        /// Name of the package
        name: String,
        /// The state the package was actually found in
        state: String,
    },

    /// A module's pre-execution phase found an invalid or missing field
    #[error("module configuration error: {message}")]
    ModuleConfiguration {
        /// What was wrong with the module definition
        message: String,
    },

    /// A module ran and failed without `allow_error`
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The status log could not be written
    #[error("could not write status log to '{path}': {source}")]
    LogPersistence {
        /// Target path of the log file
        path: String,
        /// Underlying IO fault
        #[source]
        source: std::io::Error,
    },

    /// IO error outside the status log path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl std::error::Error for CommandError {}

/// Result type for bootstrap operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display_includes_output() {
        let err = CommandError {
            command: "/usr/bin/bash -c \"false\"".to_string(),
            output: vec!["line one".to_string(), "line two".to_string()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("/usr/bin/bash"));
        assert!(rendered.contains("line one"));
        assert!(rendered.contains("line two"));
    }

    #[test]
    fn test_validation_error_lists_missing_names() {
        let err = Error::Validation {
            missing: vec!["ghost".to_string(), "phantom".to_string()],
        };
        assert!(err.to_string().contains("ghost, phantom"));
    }

    #[test]
    fn test_invalid_transition_names_actual_state() {
        let err = Error::InvalidTransition {
            name: "dotfiles".to_string(),
            state: "Solved".to_string(),
        };
        assert!(err.to_string().contains("dotfiles"));
        assert!(err.to_string().contains("Solved"));
    }
}
