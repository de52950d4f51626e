//! Generic shell modules: run a command, evaluate output, read user input

use bootstrap::{CommandError, Error, Module, ModuleResult, Result, ShellRunner, VarStore};

/// Fallback module for commands without a dedicated implementation.
///
/// Set `command` and `arguments` directly; everything else in the catalog is
/// a specialization of this.
#[derive(Debug, Clone, Default)]
pub struct ShellCommand {
    /// Command to run
    pub command: String,
    /// Pre-joined argument string
    pub arguments: String,
    /// Working directory, subject to variable expansion
    pub working_directory: Option<String>,
    /// Prefix the command with the elevation token
    pub elevate: bool,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for ShellCommand {
    fn describe(&self) -> String {
        format!("{} {}", self.command, self.arguments)
            .trim()
            .to_string()
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        ShellRunner::new(&self.command, &self.arguments)
            .working_directory(self.working_directory.clone())
            .elevate(self.elevate)
            .run(vars)
    }
}

/// Runs a command and stores its output in a variable.
#[derive(Debug, Clone)]
pub struct ShellEvaluate {
    /// Command to run
    pub command: String,
    /// Pre-joined argument string
    pub arguments: String,
    /// Name of the variable the output is stored in
    pub variable: String,
    /// Keep only the last output line (otherwise the full joined output)
    pub last_line_only: bool,
    /// Drop trailing blank lines before evaluating
    pub trim_empty: bool,
    /// Working directory, subject to variable expansion
    pub working_directory: Option<String>,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Default for ShellEvaluate {
    fn default() -> Self {
        Self {
            command: String::new(),
            arguments: String::new(),
            variable: String::new(),
            last_line_only: true,
            trim_empty: true,
            working_directory: None,
            allow_error: false,
        }
    }
}

impl Module for ShellEvaluate {
    fn describe(&self) -> String {
        format!("${} = {} {}", self.variable, self.command, self.arguments)
            .trim_end()
            .to_string()
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        if self.variable.trim().is_empty() {
            return Err(Error::ModuleConfiguration {
                message: "cannot evaluate a shell command without a variable name".to_string(),
            });
        }

        let result = ShellRunner::new(&self.command, &self.arguments)
            .working_directory(self.working_directory.clone())
            .capture_output(true)
            .run(vars)?;

        if !result.is_success() {
            return Ok(result);
        }

        let mut output = result.output.clone();
        if self.trim_empty {
            while output.last().is_some_and(|l| l.trim().is_empty()) {
                output.pop();
            }
        }

        let value = if self.last_line_only {
            output.last().cloned()
        } else if output.is_empty() {
            None
        } else {
            Some(output.join("\n"))
        };

        match value {
            Some(value) => Ok(result.with_variables(vec![(self.variable.clone(), value)])),
            None => Err(Error::Command(CommandError {
                command: result.command,
                output: vec![format!("no output to store in '${}'", self.variable)],
            })),
        }
    }
}

/// Reads a single variable from the terminal.
///
/// Runs `read` in the shell and echoes the entered value back so it can be
/// captured. Variable substitution is skipped: the `$name` token belongs to
/// the shell, not to the package's variable store.
#[derive(Debug, Clone, Default)]
pub struct ReadVariable {
    /// Name of the new variable
    pub variable: String,
    /// Optional prompt shown before reading
    pub prompt: Option<String>,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for ReadVariable {
    fn describe(&self) -> String {
        format!("read ${}", self.variable)
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        if self.variable.trim().is_empty() {
            return Err(Error::ModuleConfiguration {
                message: "cannot read a variable without a variable name".to_string(),
            });
        }

        let name = &self.variable;
        let runner = match &self.prompt {
            // The prompt goes to stderr so it does not end up in the
            // captured value.
            Some(prompt) => ShellRunner::new(
                "echo",
                format!("\"{prompt}\" 1>&2 ; read {name} ; echo ${name}"),
            ),
            None => ShellRunner::new("read", format!("{name} ; echo ${name}")),
        };

        let result = runner.substitute(false).capture_output(true).run(vars)?;

        if !result.is_success() {
            return Ok(result);
        }

        match result.output.last().cloned() {
            Some(value) => Ok(result.with_variables(vec![(self.variable.clone(), value)])),
            None => Err(Error::Command(CommandError {
                command: result.command,
                output: vec![format!("no input was read into '${}'", self.variable)],
            })),
        }
    }
}
