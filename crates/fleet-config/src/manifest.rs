//! TOML fleet manifest loading and validation.
//!
//! The manifest is parsed into private raw structures first and then
//! validated into [`FleetManifest`], so the rest of the workspace only ever
//! sees descriptors whose readiness strategy is statically known. Dependency
//! names are deliberately not resolved here: unknown names and cycles are
//! reported by the scheduler together with the full stuck set.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{
    default_clock_variable, default_max_attempts, default_poll_interval_ms, default_race_value,
    default_race_variable,
};
use crate::descriptor::{ReadinessStrategy, ServiceDescriptor, SidecarDescriptor};

/// Errors raised while loading a fleet manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read fleet manifest {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse fleet manifest {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("service '{name}' is declared more than once")]
    DuplicateService { name: String },
    #[error("service '{name}' has an empty command")]
    EmptyCommand { name: String },
    #[error("service '{name}' depends on itself")]
    SelfDependency { name: String },
    #[error("service '{name}' declares both a port and a health check; pick one")]
    AmbiguousReadiness { name: String },
    #[error("service '{name}' declares neither a port nor a health check")]
    MissingReadiness { name: String },
    #[error(
        "service '{name}' uses a health check but no checker is configured; set health.checker or [health_checker].argv"
    )]
    MissingHealthChecker { name: String },
    #[error("{section} command must not be empty")]
    EmptyStep { section: &'static str },
    #[error("readiness.max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Bounds applied to port readiness polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReadinessSettings {
    /// Milliseconds slept between two probes.
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Probes attempted before the wait times out.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl ReadinessSettings {
    /// Delay between two probes.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Names and values of the variables overlaid on every child environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSettings {
    #[serde(default = "default_race_variable")]
    pub race_variable: String,
    #[serde(default = "default_race_value")]
    pub race_value: String,
    #[serde(default = "default_clock_variable")]
    pub clock_variable: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            race_variable: default_race_variable(),
            race_value: default_race_value(),
            clock_variable: default_clock_variable(),
        }
    }
}

/// Build step run by `install`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildStep {
    pub argv: Vec<String>,
    /// Extra arguments appended when race detection is requested.
    #[serde(default)]
    pub race_argv: Vec<String>,
}

/// A single external command, such as the issuance hierarchy setup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandStep {
    pub argv: Vec<String>,
}

/// Validated fleet manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetManifest {
    pub readiness: ReadinessSettings,
    pub environment: EnvironmentSettings,
    pub build: Option<BuildStep>,
    pub hierarchy: Option<CommandStep>,
    pub sidecar: Option<SidecarDescriptor>,
    pub services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    readiness: ReadinessSettings,
    #[serde(default)]
    environment: EnvironmentSettings,
    build: Option<BuildStep>,
    hierarchy: Option<CommandStep>,
    health_checker: Option<CommandStep>,
    sidecar: Option<SidecarDescriptor>,
    #[serde(default, rename = "service")]
    services: Vec<RawService>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawService {
    name: String,
    argv: Vec<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    port: Option<u16>,
    health: Option<RawHealth>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHealth {
    address: String,
    checker: Option<Vec<String>>,
}

impl FleetManifest {
    /// Reads and validates the manifest stored at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path.as_str())
    }

    /// Validates a manifest held in memory.
    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(text).map_err(|source| ManifestError::Parse {
            origin: origin.to_owned(),
            source,
        })?;
        raw.validate()
    }
}

impl RawManifest {
    fn validate(self) -> Result<FleetManifest, ManifestError> {
        if self.readiness.max_attempts == 0 {
            return Err(ManifestError::ZeroAttempts);
        }
        ensure_step("build", self.build.as_ref().map(|step| &step.argv))?;
        ensure_step("hierarchy", self.hierarchy.as_ref().map(|step| &step.argv))?;
        ensure_step(
            "health_checker",
            self.health_checker.as_ref().map(|step| &step.argv),
        )?;
        ensure_step("sidecar", self.sidecar.as_ref().map(|sidecar| &sidecar.argv))?;

        let default_checker = self.health_checker.map(|step| step.argv);
        let mut seen = HashSet::new();
        let mut services = Vec::with_capacity(self.services.len());
        for raw in self.services {
            if !seen.insert(raw.name.clone()) {
                return Err(ManifestError::DuplicateService { name: raw.name });
            }
            services.push(raw.into_descriptor(default_checker.as_deref())?);
        }

        Ok(FleetManifest {
            readiness: self.readiness,
            environment: self.environment,
            build: self.build,
            hierarchy: self.hierarchy,
            sidecar: self.sidecar,
            services,
        })
    }
}

impl RawService {
    fn into_descriptor(
        self,
        default_checker: Option<&[String]>,
    ) -> Result<ServiceDescriptor, ManifestError> {
        let Self {
            name,
            argv,
            depends_on,
            port,
            health,
        } = self;
        if argv.is_empty() {
            return Err(ManifestError::EmptyCommand { name });
        }
        if depends_on.iter().any(|dependency| dependency == &name) {
            return Err(ManifestError::SelfDependency { name });
        }
        let readiness = match (port, health) {
            (Some(_), Some(_)) => return Err(ManifestError::AmbiguousReadiness { name }),
            (None, None) => return Err(ManifestError::MissingReadiness { name }),
            (Some(port), None) => ReadinessStrategy::PortProbe { port },
            (None, Some(RawHealth { address, checker })) => {
                let checker_argv = checker
                    .or_else(|| default_checker.map(<[String]>::to_vec))
                    .filter(|argv| !argv.is_empty());
                let Some(checker_argv) = checker_argv else {
                    return Err(ManifestError::MissingHealthChecker { name });
                };
                ReadinessStrategy::HealthCommand {
                    address,
                    checker_argv,
                }
            }
        };
        Ok(ServiceDescriptor::new(name, argv, readiness).with_dependencies(depends_on))
    }
}

fn ensure_step(section: &'static str, argv: Option<&Vec<String>>) -> Result<(), ManifestError> {
    match argv {
        Some(argv) if argv.is_empty() => Err(ManifestError::EmptyStep { section }),
        _ => Ok(()),
    }
}
