//! Subcommand execution.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use fleet_config::FleetManifest;
use fleet_orchestrator::process::{SystemShutdownSignal, spawn_listener};
use fleet_orchestrator::{
    FleetController, FleetPlan, ReadinessGate, ShutdownToken, StructuredFleetReporter,
    Supervisor, install, setup_hierarchy, telemetry,
};
use tracing::info;

use crate::cli::{Cli, CliCommand, UpArgs};
use crate::errors::AppError;

const CLI_TARGET: &str = "fleet_cli";

pub(crate) fn execute<W: Write>(cli: Cli, stdout: &mut W) -> Result<ExitCode, AppError> {
    telemetry::initialise(&cli.settings.log_filter, cli.settings.log_format)?;
    let manifest = FleetManifest::load(&cli.settings.manifest)?;
    match cli.command {
        CliCommand::Plan => print_plan(manifest, stdout),
        CliCommand::Install { race } => run_install(&manifest, race),
        CliCommand::SetupHierarchy => run_setup_hierarchy(&manifest),
        CliCommand::Up(args) => up(manifest, &args),
    }
}

fn print_plan<W: Write>(manifest: FleetManifest, stdout: &mut W) -> Result<ExitCode, AppError> {
    let plan = FleetPlan::new(manifest.services)?;
    for name in plan.names() {
        writeln!(stdout, "{name}").map_err(AppError::Output)?;
    }
    stdout.flush().map_err(AppError::Output)?;
    Ok(ExitCode::SUCCESS)
}

fn run_install(manifest: &FleetManifest, race: bool) -> Result<ExitCode, AppError> {
    let build = manifest
        .build
        .as_ref()
        .ok_or(AppError::MissingStep { section: "build" })?;
    install(build, race)?;
    Ok(ExitCode::SUCCESS)
}

fn run_setup_hierarchy(manifest: &FleetManifest) -> Result<ExitCode, AppError> {
    let step = manifest
        .hierarchy
        .as_ref()
        .ok_or(AppError::MissingStep {
            section: "hierarchy",
        })?;
    setup_hierarchy(step)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds, starts, and supervises the fleet.
///
/// The plan is resolved first so an unsatisfiable dependency table fails
/// before anything is built or spawned.
fn up(manifest: FleetManifest, args: &UpArgs) -> Result<ExitCode, AppError> {
    let FleetManifest {
        readiness,
        environment,
        build,
        hierarchy,
        sidecar,
        services,
    } = manifest;
    let plan = FleetPlan::new(services)?;

    match &build {
        Some(build) if !args.skip_build => install(build, args.race)?,
        Some(_) => info!(target: CLI_TARGET, "skipping build step"),
        None => {}
    }
    if let Some(step) = &hierarchy {
        setup_hierarchy(step)?;
    }

    let token = ShutdownToken::new();
    // The listener thread is detached; it only ever cancels the token.
    let _listener = spawn_listener(SystemShutdownSignal::install()?, token.clone());

    let mut controller = FleetController::new(
        plan,
        Supervisor::new(environment, args.race),
        ReadinessGate::from_settings(&readiness),
        sidecar,
        Arc::new(StructuredFleetReporter::new()),
    );
    if let Err(failure) = controller.start(args.fake_clock.as_deref(), &token) {
        controller.stop();
        return Err(failure.into());
    }

    let outcome = controller.supervise(&token, Duration::from_millis(args.check_interval_ms));
    if outcome.is_degraded() {
        return Err(AppError::Degraded);
    }
    Ok(ExitCode::SUCCESS)
}
