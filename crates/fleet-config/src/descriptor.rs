//! Static service declarations consumed by the orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the orchestrator decides that a freshly spawned service is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessStrategy {
    /// Poll until `localhost:port` accepts a TCP connection.
    PortProbe {
        /// Port the service listens on once ready.
        port: u16,
    },
    /// Run an external checker once against the service address.
    HealthCommand {
        /// Address handed to the checker.
        address: String,
        /// Checker command line; see [`crate::ADDRESS_PLACEHOLDER`].
        checker_argv: Vec<String>,
    },
}

impl fmt::Display for ReadinessStrategy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortProbe { port } => write!(formatter, "port {port}"),
            Self::HealthCommand { address, .. } => write!(formatter, "health check of {address}"),
        }
    }
}

/// One entry of the fleet table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    name: String,
    argv: Vec<String>,
    readiness: ReadinessStrategy,
    depends_on: Vec<String>,
}

impl ServiceDescriptor {
    /// Builds a descriptor without dependencies.
    #[must_use]
    pub fn new<N, A, S>(name: N, argv: A, readiness: ReadinessStrategy) -> Self
    where
        N: Into<String>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            argv: argv.into_iter().map(Into::into).collect(),
            readiness,
            depends_on: Vec::new(),
        }
    }

    /// Replaces the dependency list.
    #[must_use]
    pub fn with_dependencies<D, S>(mut self, depends_on: D) -> Self
    where
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = depends_on.into_iter().map(Into::into).collect();
        self
    }

    /// Unique service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command and arguments used to launch the service.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Readiness check applied after spawning.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessStrategy {
        &self.readiness
    }

    /// Names of services that must be ready before this one starts.
    #[must_use]
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// Auxiliary process started before, and stopped after, the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SidecarDescriptor {
    /// Name used in logs.
    pub name: String,
    /// Command and arguments used to launch the sidecar.
    pub argv: Vec<String>,
    /// Port probed to decide the sidecar is ready.
    pub port: u16,
}
