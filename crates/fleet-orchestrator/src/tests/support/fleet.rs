//! Builders for small fleets of real child processes.
//!
//! Services are `sleep` processes; readiness is simulated by listeners the
//! test itself holds open on ephemeral loopback ports.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use fleet_config::{EnvironmentSettings, ReadinessStrategy, ServiceDescriptor, SidecarDescriptor};

use super::reporter::RecordingFleetReporter;
use crate::controller::FleetController;
use crate::process::Supervisor;
use crate::readiness::ReadinessGate;
use crate::scheduler::FleetPlan;

/// A bound loopback listener standing in for a ready service.
pub struct OpenPort {
    listener: TcpListener,
}

impl OpenPort {
    pub fn bind() -> Self {
        Self {
            listener: TcpListener::bind(("127.0.0.1", 0)).expect("bind loopback listener"),
        }
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().expect("local addr").port()
    }
}

/// A loopback port nothing listens on.
pub fn closed_port() -> u16 {
    let port = OpenPort::bind().port();
    thread::sleep(Duration::from_millis(50));
    port
}

/// Gate small enough that a closed port fails in well under a second.
pub fn quick_gate() -> ReadinessGate {
    ReadinessGate::new(Duration::from_millis(10), 20)
}

/// Long-running service gated on `port`.
pub fn sleeper(name: &str, port: u16, depends_on: &[&str]) -> ServiceDescriptor {
    ServiceDescriptor::new(name, ["sleep", "30"], ReadinessStrategy::PortProbe { port })
        .with_dependencies(depends_on.iter().copied())
}

/// Service gated on `port` that exits with `code` after `delay_secs`.
pub fn crasher(name: &str, port: u16, delay_secs: &str, code: i32) -> ServiceDescriptor {
    let script = format!("sleep {delay_secs}; exit {code}");
    ServiceDescriptor::new(
        name,
        ["sh".to_owned(), "-c".to_owned(), script],
        ReadinessStrategy::PortProbe { port },
    )
}

pub fn sidecar(name: &str, port: u16) -> SidecarDescriptor {
    SidecarDescriptor {
        name: name.to_owned(),
        argv: vec!["sleep".to_owned(), "30".to_owned()],
        port,
    }
}

pub fn controller(
    descriptors: Vec<ServiceDescriptor>,
    sidecar: Option<SidecarDescriptor>,
    reporter: &Arc<RecordingFleetReporter>,
) -> FleetController {
    let plan = FleetPlan::new(descriptors).expect("acyclic test fleet");
    FleetController::new(
        plan,
        Supervisor::new(EnvironmentSettings::default(), false),
        quick_gate(),
        sidecar,
        reporter.clone(),
    )
}

/// Polls `check` until it reports a dead service or the deadline passes.
pub fn wait_for_degraded(controller: &mut FleetController) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if controller.check() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

/// True while `pid` names a live (or unreaped) process.
#[cfg(unix)]
pub fn pid_is_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).expect("pid fits i32");
    kill(Pid::from_raw(raw), None).is_ok()
}
