//! Child process supervision: spawning, liveness polling, graceful
//! termination, and termination-signal routing.

mod errors;
mod managed;
pub mod shutdown;
mod spawning;

pub use errors::{SpawnError, TerminateError};
pub use managed::{ExitReport, ManagedProcess, ProcessExit};
pub use shutdown::{
    ShutdownError, ShutdownSignal, ShutdownToken, SystemShutdownSignal, spawn_listener,
};
pub use spawning::Supervisor;

pub(crate) const PROCESS_TARGET: &str = "fleet_orchestrator::process";
