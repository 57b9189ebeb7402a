//! Readiness gating for freshly spawned services.
//!
//! Port probes poll until something accepts connections on the loopback
//! interface, consulting an abort predicate before every attempt. Health
//! commands are run once; a failing checker is final.

mod health;
mod probe;

use std::io;
use std::thread;
use std::time::Duration;

use fleet_config::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, ReadinessSettings, ReadinessStrategy,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::process::ProcessExit;

pub(crate) const READINESS_TARGET: &str = "fleet_orchestrator::readiness";

/// Errors raised while waiting for a service to become usable.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The abort predicate asked the gate to give up.
    #[error("stopped waiting for port {port} after {attempt} attempt(s)")]
    AbortedWait { port: u16, attempt: u32 },
    /// The port never accepted a connection within the attempt budget.
    #[error("timed out waiting for port {port} after {attempts} attempt(s)")]
    Timeout { port: u16, attempts: u32 },
    /// Probing failed for a reason other than a refused connection.
    #[error("failed to probe port {port}: {source}")]
    Probe {
        port: u16,
        #[source]
        source: io::Error,
    },
    /// No checker command is configured.
    #[error("health check for {address} has no checker command")]
    EmptyChecker { address: String },
    /// The checker could not be started.
    #[error("failed to run health checker '{program}' for {address}: {source}")]
    HealthCheckSpawn {
        address: String,
        program: String,
        #[source]
        source: io::Error,
    },
    /// The checker ran and reported the service unhealthy.
    #[error("health check for {address} failed with {exit}")]
    HealthCheckFailed { address: String, exit: ProcessExit },
}

/// Bounded poll loop blocking until a service is reachable or healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessGate {
    interval: Duration,
    max_attempts: u32,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            DEFAULT_MAX_ATTEMPTS,
        )
    }
}

impl ReadinessGate {
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ReadinessSettings) -> Self {
        Self::new(settings.interval(), settings.max_attempts)
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Blocks until `strategy` reports the service usable.
    ///
    /// `keep_waiting` is only consulted by port probes.
    pub fn wait<F>(&self, strategy: &ReadinessStrategy, keep_waiting: F) -> Result<(), ReadinessError>
    where
        F: FnMut() -> bool,
    {
        match strategy {
            ReadinessStrategy::PortProbe { port } => self.wait_for_port(*port, keep_waiting),
            ReadinessStrategy::HealthCommand {
                address,
                checker_argv,
            } => {
                health::run_health_check(address, checker_argv)?;
                info!(target: READINESS_TARGET, address = %address, "health check passed");
                Ok(())
            }
        }
    }

    /// Polls `localhost:port` until it accepts a connection.
    ///
    /// `keep_waiting` runs before every attempt; returning `false` abandons
    /// the wait immediately.
    pub fn wait_for_port<F>(&self, port: u16, mut keep_waiting: F) -> Result<(), ReadinessError>
    where
        F: FnMut() -> bool,
    {
        for attempt in 1..=self.max_attempts {
            if !keep_waiting() {
                return Err(ReadinessError::AbortedWait { port, attempt });
            }
            let reachable =
                probe::port_is_reachable(port).map_err(|source| ReadinessError::Probe { port, source })?;
            if reachable {
                debug!(target: READINESS_TARGET, port, attempt, "port accepted connection");
                return Ok(());
            }
            if attempt < self.max_attempts {
                thread::sleep(self.interval);
            }
        }
        Err(ReadinessError::Timeout {
            port,
            attempts: self.max_attempts,
        })
    }
}
