//! Error types for the CLI runtime.

use std::io;

use fleet_config::ManifestError;
use fleet_orchestrator::process::ShutdownError;
use fleet_orchestrator::{BuildFailure, SchedulerError, ServiceStartFailure, TelemetryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Schedule(#[from] SchedulerError),
    #[error(transparent)]
    Build(#[from] BuildFailure),
    #[error("the fleet manifest has no [{section}] section")]
    MissingStep { section: &'static str },
    #[error(transparent)]
    Signals(#[from] ShutdownError),
    #[error(transparent)]
    Start(#[from] ServiceStartFailure),
    #[error("a service exited unexpectedly; the fleet was stopped")]
    Degraded,
    #[error("failed to write output: {0}")]
    Output(io::Error),
}
