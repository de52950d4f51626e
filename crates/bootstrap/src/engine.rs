//! Bootstrap engine - wires storage, status log and packages into one run
//!
//! The engine is strictly sequential: packages are dispatched one at a time
//! from the evolving ready set, and modules run one at a time inside their
//! package. The only abort path is a critical package's failure, checked
//! after each package completes.

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::error::{Error, Result};
use crate::io::{TextFileInput, TextFileOutput};
use crate::package::Package;
use crate::status_log;
use crate::storage::{EvalState, PackageStorage};
use crate::types::RunReport;
use crate::vars::{HOMEDIR_VAR, USERNAME_VAR, VarStore};

/// Default status log location
pub const DEFAULT_LOG_PATH: &str = "bootstrap.log";

/// A complete bootstrap configuration, ready to run.
#[derive(Debug)]
pub struct Bootstrap {
    /// The main package pool
    pub packages: Vec<Package>,
    /// Packages run after the main pool, with their own independent storage.
    /// Main-pool packages may not require them.
    pub cleanup_packages: Vec<Package>,
    /// Variables injected into every package at dispatch time
    pub global_variables: VarStore,
    /// Where the status log is read from and written to
    pub log_path: String,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            cleanup_packages: Vec::new(),
            global_variables: VarStore::new(),
            log_path: DEFAULT_LOG_PATH.to_string(),
        }
    }
}

impl Bootstrap {
    /// Create an empty configuration with the default log path
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed environment facts into the global variables.
    ///
    /// Explicit global variables from the configuration win over defaults.
    /// The home directory is also exposed under `~` for tilde substitution.
    fn add_default_variables(&mut self) {
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();
        if !username.is_empty() {
            self.global_variables.set_default(USERNAME_VAR, &username);
        }

        match dirs::home_dir() {
            Some(home) => {
                let home = home.to_string_lossy();
                self.global_variables.set_default(HOMEDIR_VAR, &home);
                self.global_variables.set_default("~", &home);
            }
            None => log::warn!("could not determine home directory, '~' will not expand"),
        }
    }

    /// Run the full bootstrap sequence.
    ///
    /// Validation or dry-run failure aborts with zero side effects, as does
    /// a declined confirmation (reported through `RunReport::confirmed`).
    /// The status log is persisted right after the main pool finishes, so a
    /// cleanup failure can never erase main-pool progress.
    pub fn run(
        mut self,
        file_input: &dyn TextFileInput,
        file_output: &dyn TextFileOutput,
        confirm: &mut dyn ConfirmCallback,
        progress: &mut dyn ProgressCallback,
        override_confirmation: bool,
    ) -> Result<RunReport> {
        self.add_default_variables();

        let previous = status_log::load(file_input, &self.log_path)?;

        let mut main = PackageStorage::new(&previous, self.packages);
        // Cleanup packages never see main-pool log history.
        let mut cleanup = PackageStorage::new(&[], self.cleanup_packages);

        main.validate_packages()?;
        cleanup.assign_placeholder_names();
        for name in cleanup.names() {
            if main.state_of(&name).is_some() {
                return Err(Error::DuplicateName { name });
            }
        }
        main.dry_run_dependencies()?;

        progress.on_plan(&main.summaries());

        if !override_confirmation {
            let proceed = confirm
                .confirm()
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            if !proceed {
                log::info!("bootstrap cancelled at the confirmation gate");
                return Ok(RunReport::default());
            }
        }

        let aborted_by_critical = run_pool(&mut main, &self.global_variables, progress)?;

        let entries = main.log_entries();
        if let Err(err) = status_log::save(file_output, &self.log_path, &entries) {
            log::warn!("{err}");
            progress.on_log_write_failed(&err.to_string());
        }

        run_pool(&mut cleanup, &self.global_variables, progress)?;

        let report = RunReport {
            previously_run: main.count(EvalState::PreviouslyRun),
            solved: main.count(EvalState::Solved),
            failed: main.count(EvalState::Failed),
            unresolved: main.unresolved_names(),
            confirmed: true,
            aborted_by_critical,
        };
        progress.on_report(&report);

        Ok(report)
    }
}

/// Drive one pool to completion or critical failure.
///
/// Returns whether a critical package failure stopped the loop early.
fn run_pool(
    storage: &mut PackageStorage,
    globals: &VarStore,
    progress: &mut dyn ProgressCallback,
) -> Result<bool> {
    while let Some(id) = storage.next_ready() {
        let name = storage.package(id).name.clone();
        let critical = storage.package(id).critical;

        progress.on_package_start(&name);
        match storage.package_mut(id).run(globals, progress) {
            Ok(()) => {
                storage.mark_solved(&name)?;
                progress.on_package_solved(&name);
            }
            Err(command_error) => {
                storage.mark_failed(&name)?;
                progress.on_package_failed(&name, &command_error);
                if critical {
                    progress.on_critical_abort(&name);
                    return Ok(true);
                }
            }
        }
    }

    let unresolved = storage.unresolved_names();
    if !unresolved.is_empty() {
        progress.on_unresolved(&unresolved);
    }

    Ok(false)
}
