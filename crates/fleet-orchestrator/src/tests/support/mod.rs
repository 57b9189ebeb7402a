//! Test harness utilities for the fleet lifecycle suites.

mod fleet;
mod reporter;
mod world;

pub use fleet::{
    OpenPort, closed_port, controller, crasher, pid_is_alive, quick_gate, sidecar, sleeper,
    wait_for_degraded,
};
pub use reporter::{FleetEvent, RecordingFleetReporter};
pub use world::{FleetWorld, world};
