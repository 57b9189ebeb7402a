//! One-shot health checks through an external checker binary.

use std::process::Command;

use fleet_config::ADDRESS_PLACEHOLDER;
use tracing::debug;

use super::{READINESS_TARGET, ReadinessError};
use crate::process::ProcessExit;

/// Builds the checker command line for `address`.
///
/// Every `{address}` token is substituted. When no argument carries the
/// token the address is appended instead.
pub(super) fn checker_command(checker_argv: &[String], address: &str) -> Vec<String> {
    let mut argv: Vec<String> = checker_argv
        .iter()
        .map(|argument| argument.replace(ADDRESS_PLACEHOLDER, address))
        .collect();
    if !checker_argv
        .iter()
        .any(|argument| argument.contains(ADDRESS_PLACEHOLDER))
    {
        argv.push(address.to_owned());
    }
    argv
}

/// Runs the checker once and blocks until it exits.
pub(super) fn run_health_check(address: &str, checker_argv: &[String]) -> Result<(), ReadinessError> {
    if checker_argv.is_empty() {
        return Err(ReadinessError::EmptyChecker {
            address: address.to_owned(),
        });
    }
    let argv = checker_command(checker_argv, address);
    let Some((program, arguments)) = argv.split_first() else {
        return Err(ReadinessError::EmptyChecker {
            address: address.to_owned(),
        });
    };
    debug!(
        target: READINESS_TARGET,
        address,
        command = %argv.join(" "),
        "running health check"
    );
    let status = Command::new(program)
        .args(arguments)
        .status()
        .map_err(|source| ReadinessError::HealthCheckSpawn {
            address: address.to_owned(),
            program: program.clone(),
            source,
        })?;
    let exit = ProcessExit::from(status);
    if exit.success() {
        Ok(())
    } else {
        Err(ReadinessError::HealthCheckFailed {
            address: address.to_owned(),
            exit,
        })
    }
}
