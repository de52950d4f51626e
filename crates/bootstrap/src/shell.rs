//! Reusable shell plumbing for command-backed modules
//!
//! Concrete modules build a [`ShellRunner`] describing their invocation and
//! let it handle the shared two-phase contract: variable substitution over
//! command, arguments and working directory, optional `sudo` elevation,
//! process spawn through the shell, and optional line-by-line stdout capture.

use crate::error::{Error, Result};
use crate::types::{ModuleResult, ModuleState};
use crate::vars::VarStore;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

/// Shell used to run every command
const SHELL: &str = "/usr/bin/bash";

/// Prefix prepended when a command requires elevated privileges
const ELEVATION_PREFIX: &str = "sudo";

/// A single shell invocation with resolved-at-run-time variables.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    command: String,
    arguments: String,
    working_directory: Option<String>,
    elevate: bool,
    capture_output: bool,
    substitute: bool,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            command: String::new(),
            arguments: String::new(),
            working_directory: None,
            elevate: false,
            capture_output: false,
            substitute: true,
        }
    }
}

impl ShellRunner {
    /// Create a runner for `command` with a pre-joined argument string
    pub fn new(command: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: arguments.into(),
            ..Self::default()
        }
    }

    /// Run the command inside this working directory (subject to expansion)
    pub fn working_directory(mut self, dir: Option<String>) -> Self {
        self.working_directory = dir;
        self
    }

    /// Prefix the command with the elevation token
    pub fn elevate(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    /// Capture stdout lines into the module result
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Skip variable substitution over the command line.
    ///
    /// For commands whose `$name` tokens are meant for the shell itself,
    /// such as `read name ; echo $name`.
    pub fn substitute(mut self, substitute: bool) -> Self {
        self.substitute = substitute;
        self
    }

    /// The command line as it will be passed to the shell, before expansion
    pub fn describe(&self) -> String {
        let prefix = if self.elevate { ELEVATION_PREFIX } else { "" };
        format!("{prefix} {} {}", self.command, self.arguments)
            .trim()
            .to_string()
    }

    /// Expand variables, spawn the process, wait for exit.
    ///
    /// Exit code zero maps to [`ModuleState::Success`], anything else to
    /// [`ModuleState::Error`]; the code itself is not surfaced further.
    pub fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        if self.command.trim().is_empty() {
            return Err(Error::ModuleConfiguration {
                message: "cannot run a shell module without a command".to_string(),
            });
        }

        let script = if self.substitute {
            vars.expand(&self.describe())
        } else {
            self.describe()
        };
        let description = format!("{SHELL} -c \"{script}\"");

        let mut command = Command::new(SHELL);
        command.arg("-c").arg(&script);

        if let Some(dir) = &self.working_directory {
            let dir = vars.expand(dir);
            if !Path::new(&dir).is_dir() {
                return Err(Error::ModuleConfiguration {
                    message: format!("the working directory '{dir}' does not exist"),
                });
            }
            command.current_dir(dir);
        }

        log::debug!("running: {description}");

        let (status, output) = if self.capture_output {
            command.stdout(Stdio::piped());
            let mut child = command.spawn()?;
            let mut lines = Vec::new();
            if let Some(stdout) = child.stdout.take() {
                for line in BufReader::new(stdout).lines() {
                    lines.push(line?);
                }
            }
            (child.wait()?, lines)
        } else {
            (command.status()?, Vec::new())
        };

        let state = if status.success() {
            ModuleState::Success
        } else {
            ModuleState::Error
        };

        Ok(ModuleResult::new(state, description).with_output(output))
    }
}
