//! Text file abstractions for the status log
//!
//! The engine never touches the filesystem directly; it reads and writes
//! line-oriented text through these traits so tests can run against
//! in-memory implementations.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Read access to line-oriented text files
pub trait TextFileInput {
    /// Check if the file exists
    fn exists(&self, path: &str) -> bool;

    /// Read all lines of the file
    fn read_lines(&self, path: &str) -> Result<Vec<String>>;
}

/// Write access to line-oriented text files
pub trait TextFileOutput {
    /// Replace the file's content with the given lines
    fn write_lines(&self, path: &str, lines: &[String]) -> Result<()>;
}

/// Filesystem-backed text file access
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTextFile;

impl TextFileInput for FsTextFile {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn read_lines(&self, path: &str) -> Result<Vec<String>> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

impl TextFileOutput for FsTextFile {
    fn write_lines(&self, path: &str, lines: &[String]) -> Result<()> {
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(path, content).with_context(|| format!("failed to write '{path}'"))
    }
}

/// In-memory text file store for tests
#[derive(Debug, Default)]
pub struct MemoryTextFile {
    files: RefCell<HashMap<String, Vec<String>>>,
}

impl MemoryTextFile {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a file
    pub fn insert(&self, path: &str, lines: &[&str]) {
        self.files
            .borrow_mut()
            .insert(path.to_string(), lines.iter().map(|l| l.to_string()).collect());
    }

    /// Read back a written file, if any
    pub fn get(&self, path: &str) -> Option<Vec<String>> {
        self.files.borrow().get(path).cloned()
    }
}

impl TextFileInput for MemoryTextFile {
    fn exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_lines(&self, path: &str) -> Result<Vec<String>> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .with_context(|| format!("no such file '{path}'"))
    }
}

impl TextFileOutput for MemoryTextFile {
    fn write_lines(&self, path: &str, lines: &[String]) -> Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_string(), lines.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let files = MemoryTextFile::new();
        assert!(!files.exists("a.log"));
        files
            .write_lines("a.log", &["one".to_string(), "two".to_string()])
            .unwrap();
        assert!(files.exists("a.log"));
        assert_eq!(files.read_lines("a.log").unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_fs_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("status.log");
        let path = path.to_str().unwrap();

        let fs = FsTextFile;
        assert!(!TextFileInput::exists(&fs, path));
        fs.write_lines(path, &["[Solved]".to_string(), "base".to_string()])
            .unwrap();
        assert!(TextFileInput::exists(&fs, path));
        assert_eq!(fs.read_lines(path).unwrap(), vec!["[Solved]", "base"]);
    }
}
