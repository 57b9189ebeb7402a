/// Manifest path used when neither `--manifest` nor `FLEET_MANIFEST` is set.
pub const DEFAULT_MANIFEST_PATH: &str = "fleet.toml";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Delay between two readiness probes of the same port.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Number of readiness probes attempted before giving up on a port.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Environment variable carrying the race detector options.
pub const DEFAULT_RACE_VARIABLE: &str = "GORACE";

/// Race detector options exported when race detection is enabled.
pub const DEFAULT_RACE_VALUE: &str = "halt_on_error=1";

/// Environment variable carrying the simulated wall clock.
pub const DEFAULT_CLOCK_VARIABLE: &str = "FAKECLOCK";

/// Token replaced by the service address in health checker arguments.
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

pub(crate) fn default_race_variable() -> String {
    DEFAULT_RACE_VARIABLE.to_owned()
}

pub(crate) fn default_race_value() -> String {
    DEFAULT_RACE_VALUE.to_owned()
}

pub(crate) fn default_clock_variable() -> String {
    DEFAULT_CLOCK_VARIABLE.to_owned()
}
