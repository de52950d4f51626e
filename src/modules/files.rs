//! File, folder and download modules

use bootstrap::{Error, Module, ModuleResult, Result, ShellRunner, VarStore};

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::ModuleConfiguration {
            message: format!("missing required field '{field}'"),
        })
    } else {
        Ok(())
    }
}

/// Creates a symbolic link.
#[derive(Debug, Clone, Default)]
pub struct Link {
    /// What the link points to
    pub source: String,
    /// Where the link is created
    pub target: String,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for Link {
    fn describe(&self) -> String {
        format!("ln -s {} {}", self.source, self.target)
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        require("source", &self.source)?;
        require("target", &self.target)?;
        ShellRunner::new("ln", format!("-s {} {}", self.source, self.target)).run(vars)
    }
}

/// Creates a folder, including missing parents.
#[derive(Debug, Clone, Default)]
pub struct CreateFolder {
    /// Folder to create
    pub path: String,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for CreateFolder {
    fn describe(&self) -> String {
        format!("mkdir -p {}", self.path)
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        require("path", &self.path)?;
        ShellRunner::new("mkdir", format!("-p {}", self.path)).run(vars)
    }
}

/// Deletes a file or, with `recursive`, a folder.
#[derive(Debug, Clone, Default)]
pub struct Delete {
    /// Path to delete
    pub path: String,
    /// Delete folders and their content
    pub recursive: bool,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for Delete {
    fn describe(&self) -> String {
        if self.recursive {
            format!("rm -r {}", self.path)
        } else {
            format!("rm {}", self.path)
        }
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        require("path", &self.path)?;
        let arguments = if self.recursive {
            format!("-r {}", self.path)
        } else {
            self.path.clone()
        };
        ShellRunner::new("rm", arguments).run(vars)
    }
}

/// Copies a file or, with `recursive`, a folder.
#[derive(Debug, Clone, Default)]
pub struct CopyFile {
    /// Path to copy from
    pub source: String,
    /// Path to copy to
    pub target: String,
    /// Copy folders and their content
    pub recursive: bool,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for CopyFile {
    fn describe(&self) -> String {
        format!("cp {} {}", self.source, self.target)
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        require("source", &self.source)?;
        require("target", &self.target)?;
        let arguments = if self.recursive {
            format!("-r {} {}", self.source, self.target)
        } else {
            format!("{} {}", self.source, self.target)
        };
        ShellRunner::new("cp", arguments).run(vars)
    }
}

/// Downloads a file via curl.
#[derive(Debug, Clone, Default)]
pub struct Download {
    /// Url to download
    pub url: String,
    /// File to write
    pub target: String,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for Download {
    fn describe(&self) -> String {
        format!("curl -L -o {} {}", self.target, self.url)
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        require("url", &self.url)?;
        require("target", &self.target)?;
        ShellRunner::new("curl", format!("-L -o {} {}", self.target, self.url)).run(vars)
    }
}
