//! # bootstrap
//!
//! A dependency-aware bootstrap engine: declare named packages of shell-backed
//! modules, run them in dependency order, and resume interrupted runs from a
//! persisted status log.
//!
//! ## Core Concepts
//!
//! - **Module**: one operation with a success/error outcome and optional
//!   exported variables
//! - **Package**: a named, ordered list of modules plus dependency metadata
//! - **PackageStorage**: the state machine classifying packages by dependency
//!   satisfiability
//! - **Bootstrap**: the engine driving validation, confirmation, the run loop
//!   and status-log persistence
//!
//! ## Example
//!
//! ```no_run
//! use bootstrap::{
//!     AutoConfirm, Bootstrap, FsTextFile, NoProgress, Package, ShellRunner,
//!     Module, ModuleResult, VarStore,
//! };
//!
//! #[derive(Debug)]
//! struct Shell(ShellRunner);
//!
//! impl Module for Shell {
//!     fn describe(&self) -> String {
//!         self.0.describe()
//!     }
//!     fn run(&self, vars: &VarStore) -> bootstrap::Result<ModuleResult> {
//!         self.0.run(vars)
//!     }
//! }
//!
//! let mut package = Package::new("dotfiles");
//! package
//!     .modules
//!     .push(Box::new(Shell(ShellRunner::new("git", "clone $url ~/dotfiles"))));
//!
//! let mut bootstrap = Bootstrap::new();
//! let _ = bootstrap.global_variables.set("url", "https://example.org/dotfiles.git");
//! bootstrap.packages.push(package);
//!
//! let report = bootstrap
//!     .run(&FsTextFile, &FsTextFile, &mut AutoConfirm, &mut NoProgress, true)
//!     .unwrap();
//! assert!(report.is_success());
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`Module`]: the unit-of-work capability
//! - [`ConfirmCallback`]: handles the pre-run confirmation gate
//! - [`ProgressCallback`]: receives run events
//! - [`TextFileInput`] / [`TextFileOutput`]: status-log persistence
//!
//! This allows the engine to run without hard dependencies on a specific
//! terminal, filesystem layout, or module catalog.

pub mod context;
pub mod engine;
pub mod error;
pub mod io;
pub mod module;
pub mod package;
pub mod shell;
pub mod status_log;
pub mod storage;
pub mod types;
pub mod vars;

// Re-export main types at crate root
pub use context::{
    AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback, ReadConfirm,
};
pub use engine::{Bootstrap, DEFAULT_LOG_PATH};
pub use error::{CommandError, Error, Result};
pub use io::{FsTextFile, MemoryTextFile, TextFileInput, TextFileOutput};
pub use module::{BoxedModule, Module};
pub use package::Package;
pub use shell::ShellRunner;
pub use status_log::LogEntry;
pub use storage::{EvalState, PackageId, PackageStorage};
pub use types::{ModuleResult, ModuleState, PackageInfo, RunReport};
pub use vars::{HOMEDIR_VAR, USERNAME_VAR, VarStore};
