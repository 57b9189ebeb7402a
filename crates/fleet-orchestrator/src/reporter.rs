//! Structured reporting for fleet lifecycle events.

use std::sync::Arc;

use crate::controller::ServiceStartFailure;
use crate::process::{ExitReport, ProcessExit, TerminateError};

const EVENTS_TARGET: &str = "fleet_orchestrator::events";

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait FleetReporter: Send + Sync {
    /// Invoked before a service process is spawned.
    fn service_starting(&self, name: &str, command: &str);

    /// Invoked once a service passed its readiness gate.
    fn service_ready(&self, name: &str, pid: u32);

    /// Invoked when a service could not be started.
    fn service_failed(&self, failure: &ServiceStartFailure);

    /// Invoked after every service in the plan is ready.
    fn fleet_ready(&self, count: usize);

    /// Invoked for each tracked process found dead by a liveness check.
    fn process_exited(&self, report: &ExitReport);

    /// Invoked after a service process was terminated during shutdown.
    fn process_stopped(&self, name: &str, pid: u32, exit: ProcessExit);

    /// Invoked when terminating a service process failed.
    fn shutdown_failed(&self, name: &str, error: &TerminateError);

    /// Invoked once the sidecar passed its readiness gate.
    fn sidecar_started(&self, name: &str, pid: u32);

    /// Invoked after the sidecar was terminated.
    fn sidecar_stopped(&self, name: &str, pid: u32, exit: ProcessExit);
}

impl<T> FleetReporter for Arc<T>
where
    T: FleetReporter + ?Sized,
{
    fn service_starting(&self, name: &str, command: &str) {
        (**self).service_starting(name, command);
    }

    fn service_ready(&self, name: &str, pid: u32) {
        (**self).service_ready(name, pid);
    }

    fn service_failed(&self, failure: &ServiceStartFailure) {
        (**self).service_failed(failure);
    }

    fn fleet_ready(&self, count: usize) {
        (**self).fleet_ready(count);
    }

    fn process_exited(&self, report: &ExitReport) {
        (**self).process_exited(report);
    }

    fn process_stopped(&self, name: &str, pid: u32, exit: ProcessExit) {
        (**self).process_stopped(name, pid, exit);
    }

    fn shutdown_failed(&self, name: &str, error: &TerminateError) {
        (**self).shutdown_failed(name, error);
    }

    fn sidecar_started(&self, name: &str, pid: u32) {
        (**self).sidecar_started(name, pid);
    }

    fn sidecar_stopped(&self, name: &str, pid: u32, exit: ProcessExit) {
        (**self).sidecar_stopped(name, pid, exit);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredFleetReporter;

impl StructuredFleetReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FleetReporter for StructuredFleetReporter {
    fn service_starting(&self, name: &str, command: &str) {
        tracing::info!(
            target: EVENTS_TARGET,
            event = "service_starting",
            service = name,
            command,
            "starting service"
        );
    }

    fn service_ready(&self, name: &str, pid: u32) {
        tracing::info!(
            target: EVENTS_TARGET,
            event = "service_ready",
            service = name,
            pid,
            "service ready"
        );
    }

    fn service_failed(&self, failure: &ServiceStartFailure) {
        tracing::error!(
            target: EVENTS_TARGET,
            event = "service_failed",
            service = %failure.name,
            error = %failure,
            "error starting service"
        );
    }

    fn fleet_ready(&self, count: usize) {
        tracing::info!(
            target: EVENTS_TARGET,
            event = "fleet_ready",
            services = count,
            "all services running"
        );
    }

    fn process_exited(&self, report: &ExitReport) {
        tracing::error!(
            target: EVENTS_TARGET,
            event = "process_exited",
            service = %report.name,
            pid = report.pid,
            command = %report.command,
            exit = %report.exit,
            "process exited early"
        );
    }

    fn process_stopped(&self, name: &str, pid: u32, exit: ProcessExit) {
        tracing::info!(
            target: EVENTS_TARGET,
            event = "process_stopped",
            service = name,
            pid,
            exit = %exit,
            "service stopped"
        );
    }

    fn shutdown_failed(&self, name: &str, error: &TerminateError) {
        tracing::warn!(
            target: EVENTS_TARGET,
            event = "shutdown_failed",
            service = name,
            error = %error,
            "failed to stop service"
        );
    }

    fn sidecar_started(&self, name: &str, pid: u32) {
        tracing::info!(
            target: EVENTS_TARGET,
            event = "sidecar_started",
            sidecar = name,
            pid,
            "sidecar ready"
        );
    }

    fn sidecar_stopped(&self, name: &str, pid: u32, exit: ProcessExit) {
        tracing::info!(
            target: EVENTS_TARGET,
            event = "sidecar_stopped",
            sidecar = name,
            pid,
            exit = %exit,
            "sidecar stopped"
        );
    }
}
