//! CLI entrypoint for the fleet orchestrator.
//!
//! The binary delegates to [`fleet_cli::run`], which parses arguments, loads
//! the manifest, and dispatches the requested subcommand.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Unlocked handles: the signal listener thread logs to stderr while the
    // main thread supervises the fleet.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    fleet_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
