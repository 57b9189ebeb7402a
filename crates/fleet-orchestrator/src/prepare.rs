//! Preparation steps that must succeed before any service starts.

use std::io;
use std::process::{Command, Output};

use fleet_config::{BuildStep, CommandStep};
use thiserror::Error;
use tracing::{error, info};

use crate::process::ProcessExit;

const PREPARE_TARGET: &str = "fleet_orchestrator::prepare";

/// Errors raised by the build and hierarchy steps.
#[derive(Debug, Error)]
pub enum BuildFailure {
    #[error("{step} command is empty")]
    EmptyCommand { step: &'static str },
    #[error("failed to run {step} command '{program}': {source}")]
    Launch {
        step: &'static str,
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{step} command '{command}' failed with {exit}")]
    Failed {
        step: &'static str,
        command: String,
        exit: ProcessExit,
    },
}

/// Runs the build step, appending the race arguments when requested.
///
/// Output is inherited so build progress stays visible.
pub fn install(build: &BuildStep, race_detection: bool) -> Result<(), BuildFailure> {
    let mut argv = build.argv.clone();
    if race_detection {
        argv.extend(build.race_argv.iter().cloned());
    }
    let mut command = prepare_command("build", &argv)?;
    info!(target: PREPARE_TARGET, command = %argv.join(" "), race_detection, "building services");
    let status = command.status().map_err(|source| launch_error("build", &argv, source))?;
    check_exit("build", &argv, ProcessExit::from(status))
}

/// Runs the issuance hierarchy setup with captured output.
///
/// The captured output is only logged when the step fails.
pub fn setup_hierarchy(step: &CommandStep) -> Result<(), BuildFailure> {
    let mut command = prepare_command("hierarchy", &step.argv)?;
    info!(target: PREPARE_TARGET, command = %step.argv.join(" "), "setting up hierarchy");
    let output = command
        .output()
        .map_err(|source| launch_error("hierarchy", &step.argv, source))?;
    let exit = ProcessExit::from(output.status);
    if !exit.success() {
        log_output("hierarchy", &output);
    }
    check_exit("hierarchy", &step.argv, exit)
}

fn prepare_command(step: &'static str, argv: &[String]) -> Result<Command, BuildFailure> {
    let Some((program, arguments)) = argv.split_first() else {
        return Err(BuildFailure::EmptyCommand { step });
    };
    let mut command = Command::new(program);
    command.args(arguments);
    Ok(command)
}

fn launch_error(step: &'static str, argv: &[String], source: io::Error) -> BuildFailure {
    BuildFailure::Launch {
        step,
        program: argv.first().cloned().unwrap_or_default(),
        source,
    }
}

fn check_exit(step: &'static str, argv: &[String], exit: ProcessExit) -> Result<(), BuildFailure> {
    if exit.success() {
        return Ok(());
    }
    Err(BuildFailure::Failed {
        step,
        command: argv.join(" "),
        exit,
    })
}

fn log_output(step: &'static str, output: &Output) {
    error!(
        target: PREPARE_TARGET,
        step,
        stdout = %String::from_utf8_lossy(&output.stdout),
        stderr = %String::from_utf8_lossy(&output.stderr),
        "preparation step failed"
    );
}
