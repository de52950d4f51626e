//! Persisted status log
//!
//! Flat, human-readable record of each package's last known terminal
//! outcome. Format: a `[StatusLabel]` header line opens a group, followed by
//! one package name per line; blank lines between groups are tolerated on
//! read. A missing file is an empty log.

use crate::error::{Error, Result};
use crate::io::{TextFileInput, TextFileOutput};
use serde::{Deserialize, Serialize};

/// Label for packages that completed successfully in this run
pub const SOLVED_LABEL: &str = "Solved";

/// Label for packages that did not reach a confirmed-good state
pub const FAILED_LABEL: &str = "Failed";

/// Label for packages skipped because an earlier run completed them
pub const PREVIOUSLY_RUN_LABEL: &str = "PreviouslyRun";

/// One persisted `(package name, status label)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Package name
    pub name: String,
    /// Status label the package was grouped under
    pub status: String,
}

impl LogEntry {
    /// Create an entry
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Whether this entry marks the package as already completed
    pub fn is_solved(&self) -> bool {
        self.status == SOLVED_LABEL || self.status == PREVIOUSLY_RUN_LABEL
    }
}

/// Parse log lines into entries.
///
/// Names appearing before any header are ignored; they cannot be attributed
/// to a status.
pub fn parse(lines: &[String]) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    let mut current_status: Option<&str> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(label) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current_status = Some(label);
        } else if let Some(status) = current_status {
            entries.push(LogEntry::new(line, status));
        }
    }

    entries
}

/// Render entries back into the grouped text format.
///
/// Groups appear in order of first occurrence of each status label.
pub fn render(entries: &[LogEntry]) -> Vec<String> {
    let mut labels: Vec<&str> = Vec::new();
    for entry in entries {
        if !labels.contains(&entry.status.as_str()) {
            labels.push(&entry.status);
        }
    }

    let mut lines = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("[{label}]"));
        for entry in entries.iter().filter(|e| e.status == *label) {
            lines.push(entry.name.clone());
        }
    }

    lines
}

/// Load the status log, treating a missing file as empty.
pub fn load(input: &dyn TextFileInput, path: &str) -> Result<Vec<LogEntry>> {
    if !input.exists(path) {
        log::debug!("status log '{path}' does not exist, starting fresh");
        return Ok(Vec::new());
    }
    let lines = input
        .read_lines(path)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    Ok(parse(&lines))
}

/// Persist the status log.
pub fn save(output: &dyn TextFileOutput, path: &str, entries: &[LogEntry]) -> Result<()> {
    output
        .write_lines(path, &render(entries))
        .map_err(|e| Error::LogPersistence {
            path: path.to_string(),
            source: std::io::Error::other(e),
        })
}
