//! Terminal output for strappa
//!
//! Message helpers plus the two fixed-width tables around a run: the
//! pre-run package summary and the per-event progress lines.

use bootstrap::{CommandError, ModuleResult, PackageInfo, ProgressCallback, RunReport};
use colored::Colorize;

/// Number of columns reserved for package names
const PACKAGE_NAME_WIDTH: usize = 40;
/// Number of columns reserved for the module count
const MODULE_COUNT_WIDTH: usize = 3;
/// Number of columns reserved for the critical flag
const CRITICAL_WIDTH: usize = 8;
/// Total table width
const TABLE_WIDTH: usize = 100;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Truncate to `width`, marking cut-off values with an ellipsis
fn fit(value: &str, width: usize) -> String {
    if value.len() <= width {
        format!("{value:width$}")
    } else {
        format!("{}...", &value[..width.saturating_sub(3)])
    }
}

/// Print the package summary table shown before the confirmation gate.
pub fn print_plan(packages: &[PackageInfo]) {
    let module_count: usize = packages.iter().map(|p| p.module_count).sum();
    println!(
        "This bootstrap configuration contains {} packages with a total of {} operations.",
        packages.len(),
        module_count
    );
    println!();

    println!(
        "{} {} {} DESCRIPTION",
        fit("NAME", PACKAGE_NAME_WIDTH).bold(),
        fit("OPS", MODULE_COUNT_WIDTH).bold(),
        fit("CRITICAL", CRITICAL_WIDTH).bold(),
    );
    println!("{}", "=".repeat(TABLE_WIDTH));

    let description_width = TABLE_WIDTH - PACKAGE_NAME_WIDTH - MODULE_COUNT_WIDTH - CRITICAL_WIDTH - 3;
    for package in packages {
        let name = if package.previously_run {
            fit(&package.name, PACKAGE_NAME_WIDTH).dimmed().to_string()
        } else {
            fit(&package.name, PACKAGE_NAME_WIDTH)
        };
        println!(
            "{name} {:>width$} {} {}",
            package.module_count,
            fit(if package.critical { "yes" } else { "no" }, CRITICAL_WIDTH),
            fit(package.description.as_deref().unwrap_or(""), description_width),
            width = MODULE_COUNT_WIDTH,
        );
    }

    let previously_run = packages.iter().filter(|p| p.previously_run).count();
    if previously_run > 0 {
        println!();
        info(&format!(
            "{previously_run} package(s) have been finished previously and will not be run again."
        ));
    }
}

/// Print the final counts for the main pool.
pub fn print_report(report: &RunReport) {
    println!();
    println!(
        "{} packages have been run successfully.",
        report.solved.to_string().green()
    );
    println!(
        "{} packages have been run previously and were not run again.",
        report.previously_run
    );
    let leftover = report.failed + report.unresolved.len();
    if leftover > 0 {
        println!(
            "{} packages have not been run due to errors or unmet requirements.",
            leftover.to_string().red()
        );
    }
}

/// Progress adapter rendering engine events to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressCallback for ConsoleProgress {
    fn on_plan(&mut self, packages: &[PackageInfo]) {
        print_plan(packages);
    }

    fn on_package_start(&mut self, name: &str) {
        println!();
        println!("{}", format!("Starting work on '{name}'").yellow());
    }

    fn on_package_solved(&mut self, name: &str) {
        success(&format!("Finished '{name}' successfully."));
    }

    fn on_package_failed(&mut self, name: &str, err: &CommandError) {
        error(&format!("Package '{name}' failed."));
        println!("Command run:");
        println!("  {}", err.command);
        if !err.output.is_empty() {
            println!("Output:");
            for line in &err.output {
                println!("  {line}");
            }
        }
    }

    fn on_module_error_allowed(&mut self, package: &str, result: &ModuleResult) {
        warn(&format!(
            "a module of '{package}' failed but is marked 'allow_error', continuing: {}",
            result.command
        ));
    }

    fn on_critical_abort(&mut self, name: &str) {
        error(&format!(
            "Bootstrapping won't continue as '{name}' is a critical package."
        ));
    }

    fn on_unresolved(&mut self, names: &[String]) {
        warn(&format!(
            "{} package(s) are left but their requirements cannot be met:",
            names.len()
        ));
        for name in names {
            println!("  * {name}");
        }
    }

    fn on_log_write_failed(&mut self, message: &str) {
        error(message);
    }

    fn on_report(&mut self, report: &RunReport) {
        print_report(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_short_values() {
        assert_eq!(fit("abc", 5), "abc  ");
    }

    #[test]
    fn test_fit_truncates_long_values() {
        assert_eq!(fit("a-very-long-package-name", 10), "a-very-...");
    }
}
