//! Mutable fleet bookkeeping owned by the controller.

use std::fmt;

use crate::process::ManagedProcess;

/// Lifecycle phase of a fleet controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FleetPhase {
    /// Nothing has been started yet.
    #[default]
    Idle,
    /// `start` is bringing services up.
    Starting,
    /// Every service passed its readiness gate.
    Running,
    /// A tracked process exited on its own.
    Degraded,
    /// `start` gave up on a service; whatever started is still running.
    Failed,
    /// `stop` is tearing the fleet down.
    Stopping,
    /// Nothing is tracked any more.
    Stopped,
}

impl fmt::Display for FleetPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Degraded => "degraded",
            Self::Failed => "failed",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        formatter.write_str(label)
    }
}

/// Processes tracked by one controller.
///
/// `running` keeps start order; shutdown walks it from the back.
#[derive(Debug, Default)]
pub(crate) struct FleetState {
    pub(crate) running: Vec<ManagedProcess>,
    pub(crate) sidecar: Option<ManagedProcess>,
    pub(crate) phase: FleetPhase,
}

impl FleetState {
    pub(crate) fn find(&self, name: &str) -> Option<&ManagedProcess> {
        self.running.iter().find(|process| process.name() == name)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.running.is_empty() && self.sidecar.is_none()
    }
}
