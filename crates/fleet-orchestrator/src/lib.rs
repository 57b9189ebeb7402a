//! Single-host supervisor for a statically declared fleet of services.
//!
//! The orchestrator brings services up one at a time in dependency order,
//! gating each on a readiness signal before the next is spawned, detects
//! crashes by polling, and tears the fleet down in exact reverse start order.
//!
//! The moving parts are:
//! - [`scheduler`] resolves the declared dependencies into a start order and
//!   reports every unsatisfiable descriptor in one error.
//! - [`readiness`] implements the bounded port-polling protocol and the
//!   one-shot external health command.
//! - [`process`] spawns children with the configured environment overlay,
//!   polls them without blocking, and terminates them gracefully. It also
//!   routes termination signals into a [`ShutdownToken`].
//! - [`FleetController`] owns the fleet state and drives the start, check,
//!   and stop flows, including the independently managed sidecar.
//! - [`prepare`] runs the build and hierarchy steps that precede a start.
//!
//! Lifecycle events are emitted through the [`FleetReporter`] observer so
//! operators get structured `tracing` output and tests can record the exact
//! sequence of starts and stops.

mod controller;
pub mod prepare;
pub mod process;
pub mod readiness;
mod reporter;
pub mod scheduler;
mod state;
pub mod telemetry;

pub use controller::{
    FleetController, ServiceStartFailure, SidecarError, StartCause, SupervisionOutcome,
};
pub use prepare::{BuildFailure, install, setup_hierarchy};
pub use process::{
    ExitReport, ManagedProcess, ProcessExit, ShutdownToken, SpawnError, Supervisor,
    TerminateError,
};
pub use readiness::{ReadinessError, ReadinessGate};
pub use reporter::{FleetReporter, StructuredFleetReporter};
pub use scheduler::{FleetPlan, SchedulerError, StuckService, start_order};
pub use state::FleetPhase;
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(all(test, unix))]
mod tests;
