use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "strappa")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative machine bootstrapper", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a bootstrap configuration
    Run(RunArgs),

    /// Validate a configuration and dry-run its dependency graph
    Check(CheckArgs),

    /// Show the package summary without running anything
    Show(CheckArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct RunArgs {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, default_value = "bootstrap.toml")]
    pub config: PathBuf,

    /// Status log location, overriding the configuration
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Skip the confirmation gate (for unattended runs)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, default_value = "bootstrap.toml")]
    pub config: PathBuf,
}
