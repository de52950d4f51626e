//! Command implementations for the strappa CLI

use anyhow::{Context, Result};
use bootstrap::{AutoDecline, FsTextFile, NoProgress, ReadConfirm};
use std::io;
use std::path::Path;

use crate::cli::{CheckArgs, RunArgs};
use crate::config::BootstrapConfig;
use crate::ui::{self, ConsoleProgress};

/// Execute a bootstrap configuration. Returns whether every package reached
/// a confirmed-good state.
pub fn run(args: RunArgs) -> Result<bool> {
    let mut engine = load(&args.config)?.into_bootstrap();
    if let Some(log) = args.log {
        engine.log_path = shellexpand::tilde(&log.to_string_lossy()).into_owned();
    }

    let stdin = io::stdin();
    let mut confirm = ReadConfirm::new(stdin.lock());
    let mut progress = ConsoleProgress;

    let report = match engine.run(
        &FsTextFile,
        &FsTextFile,
        &mut confirm,
        &mut progress,
        args.yes,
    ) {
        Ok(report) => report,
        Err(err) => {
            ui::error(&format!("Execution stopped because: {err}"));
            return Ok(false);
        }
    };

    if !report.confirmed {
        ui::info("Bootstrap cancelled, nothing was run.");
        return Ok(false);
    }

    Ok(report.is_success())
}

/// Validate a configuration and dry-run its dependency graph, without
/// executing anything.
///
/// Implemented as an engine run that declines its own confirmation gate:
/// validation and the dry run happen before the gate, side effects after it.
pub fn check(args: CheckArgs) -> Result<bool> {
    let engine = load(&args.config)?.into_bootstrap();

    match engine.run(&FsTextFile, &FsTextFile, &mut AutoDecline, &mut NoProgress, false) {
        Ok(_) => {
            ui::success("Configuration is valid and the dependency graph is solvable.");
            Ok(true)
        }
        Err(err) => {
            ui::error(&format!("{err}"));
            Ok(false)
        }
    }
}

/// Print the package summary table, then stop before running anything.
pub fn show(args: CheckArgs) -> Result<bool> {
    let engine = load(&args.config)?.into_bootstrap();

    match engine.run(
        &FsTextFile,
        &FsTextFile,
        &mut AutoDecline,
        &mut ConsoleProgress,
        false,
    ) {
        Ok(_) => Ok(true),
        Err(err) => {
            ui::error(&format!("{err}"));
            Ok(false)
        }
    }
}

fn load(path: &Path) -> Result<BootstrapConfig> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let mut candidate = std::path::PathBuf::from(&expanded);

    // Fall back to the user config directory when nothing matches in the
    // working directory.
    if !candidate.exists()
        && let Some(fallback) = default_config_path()
        && fallback.exists()
    {
        candidate = fallback;
    }

    BootstrapConfig::load(&candidate).with_context(|| {
        format!(
            "could not load bootstrap configuration from '{}'",
            candidate.display()
        )
    })
}

/// The default config location: ~/.config/strappa/bootstrap.toml
fn default_config_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("strappa").join("bootstrap.toml"))
}
