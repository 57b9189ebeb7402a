//! Operator-facing runtime settings.
//!
//! Values resolve in the order command-line flag, environment variable,
//! built-in default. The struct is flattened into the CLI parser so every
//! subcommand accepts the same global flags.

use camino::Utf8PathBuf;
use clap::Args;
use strum::{Display, EnumString};

use crate::defaults::{DEFAULT_LOG_FILTER, DEFAULT_MANIFEST_PATH};

/// Shape of the events written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Flattened JSON, one event per line.
    #[default]
    Json,
    /// Human-readable single-line events.
    Compact,
}

/// Runtime settings shared by every `fleet` subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Settings {
    /// Path to the fleet manifest.
    #[arg(
        long,
        env = "FLEET_MANIFEST",
        default_value = DEFAULT_MANIFEST_PATH,
        global = true
    )]
    pub manifest: Utf8PathBuf,
    /// `tracing` filter expression, for example `info` or `fleet_orchestrator=debug`.
    #[arg(
        long,
        env = "FLEET_LOG_FILTER",
        default_value = DEFAULT_LOG_FILTER,
        global = true
    )]
    pub log_filter: String,
    /// Log output format.
    #[arg(
        long,
        env = "FLEET_LOG_FORMAT",
        default_value_t = LogFormat::Json,
        global = true
    )]
    pub log_format: LogFormat,
}
