//! Bootstrap configuration loading
//!
//! Deserializes a TOML (or JSON) file into the engine's package model. The
//! dynamic module mapping is an internally-tagged enum: every module table
//! carries a `type` field naming its catalog entry.

use anyhow::{Context, Result};
use bootstrap::{Bootstrap, BoxedModule, Package, VarStore};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::modules::{
    CopyFile, CreateFolder, Delete, Download, GSettings, GitClone, GitPull, Link, PackageInstall,
    PackageUpdate, ReadVariable, Service, ShellCommand, ShellEvaluate,
};

/// Top-level configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct BootstrapConfig {
    /// Status log location; the engine default applies when absent
    #[serde(default)]
    pub log_file: Option<String>,

    /// Variables injected into every package
    #[serde(default)]
    pub global_variables: BTreeMap<String, String>,

    /// The main package pool
    #[serde(default)]
    pub packages: Vec<PackageConfig>,

    /// Packages run after the main pool; the main pool may not require them
    #[serde(default)]
    pub cleanup_packages: Vec<PackageConfig>,
}

/// One package declaration
#[derive(Debug, Default, Deserialize)]
pub struct PackageConfig {
    /// Unique package name; a placeholder is assigned when empty
    #[serde(default)]
    pub name: String,

    /// Optional description shown in the summary table
    #[serde(default)]
    pub description: Option<String>,

    /// Names of packages that must complete first
    #[serde(default)]
    pub requires: Vec<String>,

    /// A failure of this package stops the whole run
    #[serde(default)]
    pub critical: bool,

    /// Run even when the status log says this package already completed
    #[serde(default)]
    pub ignore_already_solved: bool,

    /// Package-scoped variables; they win over global variables
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// The work itself, in execution order
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// One module declaration, dispatched on its `type` tag
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleConfig {
    /// Generic shell command
    Shell {
        command: String,
        #[serde(default)]
        arguments: String,
        #[serde(default)]
        working_directory: Option<String>,
        #[serde(default)]
        elevate: bool,
        #[serde(default)]
        allow_error: bool,
    },
    /// Capture command output into a variable
    ShellEval {
        command: String,
        #[serde(default)]
        arguments: String,
        variable: String,
        #[serde(default = "default_true")]
        last_line_only: bool,
        #[serde(default = "default_true")]
        trim_empty: bool,
        #[serde(default)]
        working_directory: Option<String>,
        #[serde(default)]
        allow_error: bool,
    },
    /// Read a variable from the terminal
    ReadVariable {
        variable: String,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        allow_error: bool,
    },
    /// Clone a git repository
    GitClone {
        url: String,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        working_directory: Option<String>,
        #[serde(default)]
        allow_error: bool,
    },
    /// Pull an existing checkout
    GitPull {
        #[serde(default)]
        working_directory: Option<String>,
        #[serde(default)]
        allow_error: bool,
    },
    /// Create a symlink
    Link {
        source: String,
        target: String,
        #[serde(default)]
        allow_error: bool,
    },
    /// Create a folder with parents
    Folder {
        path: String,
        #[serde(default)]
        allow_error: bool,
    },
    /// Delete a file or folder
    Delete {
        path: String,
        #[serde(default)]
        recursive: bool,
        #[serde(default)]
        allow_error: bool,
    },
    /// Copy a file or folder
    Copy {
        source: String,
        target: String,
        #[serde(default)]
        recursive: bool,
        #[serde(default)]
        allow_error: bool,
    },
    /// Download a file via curl
    Download {
        url: String,
        target: String,
        #[serde(default)]
        allow_error: bool,
    },
    /// Install distro packages
    PackageInstall {
        #[serde(default)]
        packages: Vec<String>,
        #[serde(default)]
        source_file: Option<String>,
        #[serde(default)]
        allow_error: bool,
    },
    /// Update all distro packages
    PackageUpdate {
        #[serde(default)]
        allow_error: bool,
    },
    /// Control a systemd service
    Service {
        name: String,
        #[serde(default = "default_service_action")]
        action: String,
        #[serde(default)]
        allow_error: bool,
    },
    /// Set a GNOME desktop setting
    Gsettings {
        schema: String,
        key: String,
        value: String,
        #[serde(default)]
        allow_error: bool,
    },
}

fn default_true() -> bool {
    true
}

fn default_service_action() -> String {
    "enable".to_string()
}

impl BootstrapConfig {
    /// Load a configuration file, dispatching on its extension.
    ///
    /// `.json` files are parsed as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read config file: {}", path.display()))?;

        if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))
        } else {
            toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
        }
    }

    /// Convert the parsed file into an engine configuration
    pub fn into_bootstrap(self) -> Bootstrap {
        let mut engine = Bootstrap::new();
        if let Some(log_file) = self.log_file {
            engine.log_path = shellexpand::tilde(&log_file).into_owned();
        }
        engine.global_variables = to_var_store(&self.global_variables);
        engine.packages = self
            .packages
            .into_iter()
            .map(PackageConfig::into_package)
            .collect();
        engine.cleanup_packages = self
            .cleanup_packages
            .into_iter()
            .map(PackageConfig::into_package)
            .collect();
        engine
    }
}

impl PackageConfig {
    /// Convert one package declaration into an engine package
    pub fn into_package(self) -> Package {
        let mut package = Package::new(self.name);
        package.description = self.description;
        package.requires = self.requires;
        package.critical = self.critical;
        package.ignore_already_solved = self.ignore_already_solved;
        package.variables = to_var_store(&self.variables);
        package.modules = self
            .modules
            .into_iter()
            .map(ModuleConfig::into_module)
            .collect();
        package
    }
}

impl ModuleConfig {
    /// Instantiate the catalog module this declaration names
    pub fn into_module(self) -> BoxedModule {
        match self {
            Self::Shell {
                command,
                arguments,
                working_directory,
                elevate,
                allow_error,
            } => Box::new(ShellCommand {
                command,
                arguments,
                working_directory,
                elevate,
                allow_error,
            }),
            Self::ShellEval {
                command,
                arguments,
                variable,
                last_line_only,
                trim_empty,
                working_directory,
                allow_error,
            } => Box::new(ShellEvaluate {
                command,
                arguments,
                variable,
                last_line_only,
                trim_empty,
                working_directory,
                allow_error,
            }),
            Self::ReadVariable {
                variable,
                prompt,
                allow_error,
            } => Box::new(ReadVariable {
                variable,
                prompt,
                allow_error,
            }),
            Self::GitClone {
                url,
                target,
                working_directory,
                allow_error,
            } => Box::new(GitClone {
                url,
                target,
                working_directory,
                allow_error,
            }),
            Self::GitPull {
                working_directory,
                allow_error,
            } => Box::new(GitPull {
                working_directory,
                allow_error,
            }),
            Self::Link {
                source,
                target,
                allow_error,
            } => Box::new(Link {
                source,
                target,
                allow_error,
            }),
            Self::Folder { path, allow_error } => Box::new(CreateFolder { path, allow_error }),
            Self::Delete {
                path,
                recursive,
                allow_error,
            } => Box::new(Delete {
                path,
                recursive,
                allow_error,
            }),
            Self::Copy {
                source,
                target,
                recursive,
                allow_error,
            } => Box::new(CopyFile {
                source,
                target,
                recursive,
                allow_error,
            }),
            Self::Download {
                url,
                target,
                allow_error,
            } => Box::new(Download {
                url,
                target,
                allow_error,
            }),
            Self::PackageInstall {
                packages,
                source_file,
                allow_error,
            } => Box::new(PackageInstall {
                packages,
                source_file,
                allow_error,
            }),
            Self::PackageUpdate { allow_error } => Box::new(PackageUpdate { allow_error }),
            Self::Service {
                name,
                action,
                allow_error,
            } => Box::new(Service {
                name,
                action,
                allow_error,
            }),
            Self::Gsettings {
                schema,
                key,
                value,
                allow_error,
            } => Box::new(GSettings {
                schema,
                key,
                value,
                allow_error,
            }),
        }
    }
}

fn to_var_store(map: &BTreeMap<String, String>) -> VarStore {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}
