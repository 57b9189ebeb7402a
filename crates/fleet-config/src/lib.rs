//! Shared configuration for the fleet orchestrator.
//!
//! The crate owns two layers of configuration:
//! - [`Settings`], the operator-facing runtime knobs (manifest location and
//!   logging) resolved from command-line flags, then environment variables,
//!   then built-in defaults.
//! - [`FleetManifest`], the static TOML table declaring the services to run,
//!   their launch commands, dependencies, and readiness checks, together with
//!   optional build, hierarchy, and sidecar steps.

mod defaults;
mod descriptor;
mod manifest;
mod settings;

pub use defaults::{ADDRESS_PLACEHOLDER, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
pub use descriptor::{ReadinessStrategy, ServiceDescriptor, SidecarDescriptor};
pub use manifest::{
    BuildStep, CommandStep, EnvironmentSettings, FleetManifest, ManifestError, ReadinessSettings,
};
pub use settings::{LogFormat, Settings};
