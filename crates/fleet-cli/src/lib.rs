//! Command-line interface runtime for the fleet orchestrator.
//!
//! The module owns argument parsing, manifest loading, and subcommand
//! dispatch. [`run`] takes its IO streams as parameters so tests can capture
//! output without spawning the binary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod errors;

use cli::Cli;
use errors::AppError;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let result = Cli::try_parse_from(args)
        .map_err(AppError::CliUsage)
        .and_then(|cli| commands::execute(cli, stdout));
    match result {
        Ok(exit_code) => exit_code,
        Err(AppError::CliUsage(error)) => report_usage(&error, stdout, stderr),
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

/// Writes clap output: help and version go to stdout, usage errors to stderr.
fn report_usage<W, E>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    W: Write,
    E: Write,
{
    let rendered = error.to_string();
    if error.use_stderr() {
        let _ = write!(stderr, "{rendered}");
        ExitCode::FAILURE
    } else {
        let _ = write!(stdout, "{rendered}");
        ExitCode::SUCCESS
    }
}
