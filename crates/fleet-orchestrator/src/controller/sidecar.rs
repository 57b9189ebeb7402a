//! The sidecar: an auxiliary process started before the fleet and stopped
//! after it, outside the dependency graph.

use thiserror::Error;
use tracing::info;

use super::{CONTROLLER_TARGET, FleetController};
use crate::process::{ProcessExit, ShutdownToken, SpawnError};
use crate::readiness::ReadinessError;

/// Errors raised while starting the sidecar.
#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("no sidecar is configured")]
    NotConfigured,
    #[error("sidecar '{name}' is already running with pid {pid}")]
    AlreadyRunning { name: String, pid: u32 },
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error("sidecar '{name}' exited with {exit} before becoming ready")]
    Exited { name: String, exit: ProcessExit },
    #[error("sidecar '{name}' did not become ready: {source}")]
    Readiness {
        name: String,
        #[source]
        source: ReadinessError,
    },
}

impl FleetController {
    /// Spawns the configured sidecar and waits for its port.
    ///
    /// The wait gives up once `shutdown` is cancelled or the sidecar exits.
    /// The sidecar stays tracked when the wait fails, so a later
    /// [`FleetController::stop_sidecar`] or [`FleetController::stop`] still
    /// reaps it.
    pub fn start_sidecar(&mut self, shutdown: &ShutdownToken) -> Result<(), SidecarError> {
        let Some(descriptor) = self.sidecar.clone() else {
            return Err(SidecarError::NotConfigured);
        };
        if let Some(existing) = &self.state.sidecar {
            return Err(SidecarError::AlreadyRunning {
                name: descriptor.name,
                pid: existing.pid(),
            });
        }
        let process = self.supervisor.spawn(&descriptor.name, &descriptor.argv, None)?;
        let pid = process.pid();
        self.state.sidecar = Some(process);

        let gate = self.gate;
        let sidecar = &mut self.state.sidecar;
        let waited = gate.wait_for_port(descriptor.port, || {
            !shutdown.is_cancelled()
                && sidecar
                    .as_mut()
                    .is_some_and(|process| matches!(process.poll(), Ok(None)))
        });
        if let Err(source) = waited {
            let exit = self.state.sidecar.as_ref().and_then(|process| process.exit());
            return Err(match (source, exit) {
                (ReadinessError::AbortedWait { .. }, Some(exit)) => SidecarError::Exited {
                    name: descriptor.name,
                    exit,
                },
                (source, _) => SidecarError::Readiness {
                    name: descriptor.name,
                    source,
                },
            });
        }
        self.reporter.sidecar_started(&descriptor.name, pid);
        Ok(())
    }

    /// Terminates the sidecar if one is tracked.
    pub fn stop_sidecar(&mut self) {
        let Some(mut process) = self.state.sidecar.take() else {
            return;
        };
        info!(
            target: CONTROLLER_TARGET,
            sidecar = process.name(),
            pid = process.pid(),
            "stopping sidecar"
        );
        match process.terminate() {
            Ok(exit) => self
                .reporter
                .sidecar_stopped(process.name(), process.pid(), exit),
            Err(error) => self.reporter.shutdown_failed(process.name(), &error),
        }
    }
}
