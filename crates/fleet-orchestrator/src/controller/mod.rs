//! Fleet lifecycle orchestration.
//!
//! The controller owns every process it spawns. Services are started one at
//! a time in plan order and each must pass its readiness gate before the next
//! is spawned. A failed start is reported and returned without rolling back
//! the services that already run; [`FleetController::stop`] (or dropping the
//! controller) tears them down in reverse start order.

mod sidecar;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fleet_config::{ServiceDescriptor, SidecarDescriptor};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::process::{ExitReport, ManagedProcess, ShutdownToken, SpawnError, Supervisor};
use crate::readiness::{ReadinessError, ReadinessGate};
use crate::reporter::FleetReporter;
use crate::scheduler::FleetPlan;
use crate::state::{FleetPhase, FleetState};

pub use sidecar::SidecarError;

pub(crate) const CONTROLLER_TARGET: &str = "fleet_orchestrator::controller";

/// A service that could not be brought up.
#[derive(Debug, Error)]
#[error("error starting service {name}: {cause}")]
pub struct ServiceStartFailure {
    /// Descriptor (or sidecar) name.
    pub name: String,
    #[source]
    pub cause: StartCause,
}

/// Why a service failed to start.
#[derive(Debug, Error)]
pub enum StartCause {
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Readiness(#[from] ReadinessError),
    #[error(transparent)]
    Sidecar(#[from] SidecarError),
    /// The controller already tracks a live process under this name.
    #[error("already running with pid {pid}")]
    AlreadyRunning { pid: u32 },
}

/// How [`FleetController::supervise`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionOutcome {
    /// The shutdown token was cancelled.
    ShutdownRequested,
    /// A tracked service exited on its own.
    Degraded,
}

impl SupervisionOutcome {
    #[must_use]
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Degraded)
    }
}

/// Starts, watches, and stops one fleet of services.
pub struct FleetController {
    plan: FleetPlan,
    supervisor: Supervisor,
    gate: ReadinessGate,
    sidecar: Option<SidecarDescriptor>,
    reporter: Arc<dyn FleetReporter>,
    state: FleetState,
}

impl FleetController {
    #[must_use]
    pub fn new(
        plan: FleetPlan,
        supervisor: Supervisor,
        gate: ReadinessGate,
        sidecar: Option<SidecarDescriptor>,
        reporter: Arc<dyn FleetReporter>,
    ) -> Self {
        Self {
            plan,
            supervisor,
            gate,
            sidecar,
            reporter,
            state: FleetState::default(),
        }
    }

    /// Brings the sidecar and then every planned service up.
    ///
    /// Port probes give up as soon as `shutdown` is cancelled or a tracked
    /// process is found dead. The sidecar wait also honours `shutdown`. On failure the processes started so far keep
    /// running.
    pub fn start(
        &mut self,
        clock_override: Option<&str>,
        shutdown: &ShutdownToken,
    ) -> Result<(), ServiceStartFailure> {
        self.state.phase = FleetPhase::Starting;
        info!(
            target: CONTROLLER_TARGET,
            services = self.plan.len(),
            order = ?self.plan.names(),
            "starting fleet"
        );

        if let Some(descriptor) = &self.sidecar
            && self.state.sidecar.is_none()
        {
            let name = descriptor.name.clone();
            if let Err(error) = self.start_sidecar(shutdown) {
                return Err(self.fail(name, StartCause::Sidecar(error)));
            }
        }

        let descriptors: Vec<ServiceDescriptor> = self.plan.ordered().cloned().collect();
        for descriptor in &descriptors {
            if let Err(cause) = self.start_service(descriptor, clock_override, shutdown) {
                return Err(self.fail(descriptor.name().to_owned(), cause));
            }
        }

        self.state.phase = FleetPhase::Running;
        self.reporter.fleet_ready(self.state.running.len());
        Ok(())
    }

    fn start_service(
        &mut self,
        descriptor: &ServiceDescriptor,
        clock_override: Option<&str>,
        shutdown: &ShutdownToken,
    ) -> Result<(), StartCause> {
        if let Some(existing) = self.state.find(descriptor.name()) {
            return Err(StartCause::AlreadyRunning {
                pid: existing.pid(),
            });
        }
        self.reporter
            .service_starting(descriptor.name(), &descriptor.argv().join(" "));
        let process = self
            .supervisor
            .spawn(descriptor.name(), descriptor.argv(), clock_override)?;
        let pid = process.pid();
        self.state.running.push(process);

        debug!(
            target: CONTROLLER_TARGET,
            service = descriptor.name(),
            readiness = %descriptor.readiness(),
            "waiting for service"
        );
        let gate = self.gate;
        gate.wait(descriptor.readiness(), || {
            !shutdown.is_cancelled() && !self.check()
        })?;
        self.reporter.service_ready(descriptor.name(), pid);
        Ok(())
    }

    fn fail(&mut self, name: String, cause: StartCause) -> ServiceStartFailure {
        let failure = ServiceStartFailure { name, cause };
        self.reporter.service_failed(&failure);
        self.state.phase = FleetPhase::Failed;
        failure
    }

    /// Reports whether any tracked service died since the last check.
    ///
    /// Dead entries are removed and reported. The sidecar is not considered.
    pub fn check(&mut self) -> bool {
        !self.reap_exited().is_empty()
    }

    /// Removes and returns every tracked service that has exited.
    pub fn reap_exited(&mut self) -> Vec<ExitReport> {
        let reporter = &self.reporter;
        let mut reports = Vec::new();
        self.state.running.retain_mut(|process| match process.poll() {
            Ok(None) => true,
            Ok(Some(exit)) => {
                let report = ExitReport::new(process, exit);
                reporter.process_exited(&report);
                reports.push(report);
                false
            }
            Err(error) => {
                warn!(
                    target: CONTROLLER_TARGET,
                    service = process.name(),
                    %error,
                    "failed to poll service; keeping it tracked"
                );
                true
            }
        });
        if !reports.is_empty() {
            self.state.phase = FleetPhase::Degraded;
        }
        reports
    }

    /// Terminates every tracked process, newest first, then the sidecar.
    ///
    /// Termination failures are reported and skipped. Calling `stop` again
    /// does nothing.
    pub fn stop(&mut self) {
        if self.state.is_empty() {
            if self.state.phase != FleetPhase::Idle {
                self.state.phase = FleetPhase::Stopped;
            }
            return;
        }
        self.state.phase = FleetPhase::Stopping;
        info!(
            target: CONTROLLER_TARGET,
            services = self.state.running.len(),
            "stopping fleet"
        );
        while let Some(mut process) = self.state.running.pop() {
            match process.terminate() {
                Ok(exit) => self
                    .reporter
                    .process_stopped(process.name(), process.pid(), exit),
                Err(error) => self.reporter.shutdown_failed(process.name(), &error),
            }
        }
        self.stop_sidecar();
        self.state.phase = FleetPhase::Stopped;
    }

    /// Watches the fleet until `shutdown` is cancelled or a service dies, then
    /// stops everything.
    pub fn supervise(&mut self, shutdown: &ShutdownToken, interval: Duration) -> SupervisionOutcome {
        let outcome = loop {
            if shutdown.is_cancelled() {
                info!(target: CONTROLLER_TARGET, "shutdown requested");
                break SupervisionOutcome::ShutdownRequested;
            }
            if self.check() {
                break SupervisionOutcome::Degraded;
            }
            thread::sleep(interval);
        };
        self.stop();
        outcome
    }

    #[must_use]
    pub fn phase(&self) -> FleetPhase {
        self.state.phase
    }

    #[must_use]
    pub fn plan(&self) -> &FleetPlan {
        &self.plan
    }

    /// Tracked services in start order.
    #[must_use]
    pub fn running(&self) -> &[ManagedProcess] {
        &self.state.running
    }

    #[must_use]
    pub fn running_names(&self) -> Vec<&str> {
        self.state.running.iter().map(ManagedProcess::name).collect()
    }

    #[must_use]
    pub fn sidecar(&self) -> Option<&ManagedProcess> {
        self.state.sidecar.as_ref()
    }
}

impl Drop for FleetController {
    fn drop(&mut self) {
        self.stop();
    }
}
