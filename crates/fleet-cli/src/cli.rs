//! CLI argument definitions for the `fleet` binary.

use clap::{Args, Parser, Subcommand};
use fleet_config::Settings;

/// Interval between two liveness checks while the fleet is up.
pub(crate) const DEFAULT_CHECK_INTERVAL_MS: u64 = 500;

/// Command-line interface for the service fleet orchestrator.
#[derive(Parser, Debug)]
#[command(
    name = "fleet",
    version,
    about = "Start, supervise, and stop a fleet of interdependent services",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) settings: Settings,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Subcommands of the `fleet` binary.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Prints the start order, one service per line.
    Plan,
    /// Runs the manifest's build step.
    Install {
        /// Builds with race detection enabled.
        #[arg(long)]
        race: bool,
    },
    /// Runs the manifest's issuance hierarchy step.
    SetupHierarchy,
    /// Builds, starts, and supervises the fleet until interrupted or a
    /// service exits.
    Up(UpArgs),
}

/// Options for `fleet up`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpArgs {
    /// Builds with race detection and exports the race detector options.
    #[arg(long)]
    pub(crate) race: bool,
    /// Simulated wall clock exported to every service.
    #[arg(long, value_name = "TIMESTAMP")]
    pub(crate) fake_clock: Option<String>,
    /// Skips the build step.
    #[arg(long)]
    pub(crate) skip_build: bool,
    /// Milliseconds between two liveness checks.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_CHECK_INTERVAL_MS)]
    pub(crate) check_interval_ms: u64,
}
