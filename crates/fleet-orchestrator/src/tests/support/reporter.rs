//! Test double for [`FleetReporter`] that records lifecycle events for
//! assertions.

use std::sync::Mutex;

use crate::controller::ServiceStartFailure;
use crate::process::{ExitReport, ProcessExit, TerminateError};
use crate::reporter::FleetReporter;

/// Lifecycle events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetEvent {
    ServiceStarting(String),
    ServiceReady(String),
    ServiceFailed { name: String, message: String },
    FleetReady(usize),
    ProcessExited { name: String, exit: ProcessExit },
    ProcessStopped(String),
    ShutdownFailed(String),
    SidecarStarted(String),
    SidecarStopped(String),
}

/// Records fleet events for assertions.
#[derive(Debug, Default)]
pub struct RecordingFleetReporter {
    events: Mutex<Vec<FleetEvent>>,
}

impl RecordingFleetReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<FleetEvent> {
        self.events
            .lock()
            .expect("fleet reporter mutex poisoned")
            .clone()
    }

    /// Names of stopped services and sidecars, in stop order.
    #[must_use]
    pub fn stopped(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FleetEvent::ProcessStopped(name) | FleetEvent::SidecarStopped(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Names of services found dead by liveness checks.
    #[must_use]
    pub fn exited(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FleetEvent::ProcessExited { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: FleetEvent) {
        self.events
            .lock()
            .expect("fleet reporter mutex poisoned")
            .push(event);
    }
}

impl FleetReporter for RecordingFleetReporter {
    fn service_starting(&self, name: &str, _command: &str) {
        self.record(FleetEvent::ServiceStarting(name.to_owned()));
    }

    fn service_ready(&self, name: &str, _pid: u32) {
        self.record(FleetEvent::ServiceReady(name.to_owned()));
    }

    fn service_failed(&self, failure: &ServiceStartFailure) {
        self.record(FleetEvent::ServiceFailed {
            name: failure.name.clone(),
            message: failure.to_string(),
        });
    }

    fn fleet_ready(&self, count: usize) {
        self.record(FleetEvent::FleetReady(count));
    }

    fn process_exited(&self, report: &ExitReport) {
        self.record(FleetEvent::ProcessExited {
            name: report.name.clone(),
            exit: report.exit,
        });
    }

    fn process_stopped(&self, name: &str, _pid: u32, _exit: ProcessExit) {
        self.record(FleetEvent::ProcessStopped(name.to_owned()));
    }

    fn shutdown_failed(&self, name: &str, _error: &TerminateError) {
        self.record(FleetEvent::ShutdownFailed(name.to_owned()));
    }

    fn sidecar_started(&self, name: &str, _pid: u32) {
        self.record(FleetEvent::SidecarStarted(name.to_owned()));
    }

    fn sidecar_stopped(&self, name: &str, _pid: u32, _exit: ProcessExit) {
        self.record(FleetEvent::SidecarStopped(name.to_owned()));
    }
}
