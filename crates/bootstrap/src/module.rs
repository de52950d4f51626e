//! Module trait - the single capability every unit of work implements
//!
//! A module is one operation inside a package, typically a shell command.
//! Concrete module types live with the caller; the engine only sees this
//! trait. Shell-backed modules compose [`crate::shell::ShellRunner`] rather
//! than inheriting from it.

use crate::error::Result;
use crate::types::ModuleResult;
use crate::vars::VarStore;
use std::fmt;

/// Core trait for bootstrap modules
///
/// # Example
///
/// ```ignore
/// use bootstrap::{Module, ModuleResult, ModuleState, VarStore};
///
/// #[derive(Debug)]
/// struct TouchFile {
///     path: String,
/// }
///
/// impl Module for TouchFile {
///     fn describe(&self) -> String {
///         format!("touch {}", self.path)
///     }
///
///     fn run(&self, vars: &VarStore) -> bootstrap::Result<ModuleResult> {
///         let path = vars.expand(&self.path);
///         std::fs::write(&path, "")?;
///         Ok(ModuleResult::new(ModuleState::Success, format!("touch {path}")))
///     }
/// }
/// ```
pub trait Module: Send + Sync + fmt::Debug {
    /// Human-readable description of the operation, used in summaries and
    /// failure messages before the expanded command is known
    fn describe(&self) -> String;

    /// Whether the owning package keeps running when this module fails
    fn allow_error(&self) -> bool {
        false
    }

    /// Perform the operation with the current package variables.
    ///
    /// Returns `Err` only for faults that prevent the operation from being
    /// attempted at all (invalid module configuration, spawn failure). A
    /// command that runs and exits non-zero is an `Ok` result with
    /// [`crate::ModuleState::Error`].
    fn run(&self, vars: &VarStore) -> Result<ModuleResult>;
}

/// A boxed module for type-erased storage inside a package
pub type BoxedModule = Box<dyn Module>;
