//! Service process spawning.
//!
//! Children inherit the orchestrator's stdio and environment. On top of the
//! ambient environment the supervisor exports the race detector options (when
//! race detection is on) and the simulated clock (when an override is
//! supplied). Neither replaces a value the operator already exported.

use std::env;
use std::process::Command;

use fleet_config::EnvironmentSettings;
use tracing::info;

use super::PROCESS_TARGET;
use super::errors::SpawnError;
use super::managed::ManagedProcess;

/// Spawns service processes with the fleet's environment overlay.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    environment: EnvironmentSettings,
    race_detection: bool,
}

impl Supervisor {
    #[must_use]
    pub fn new(environment: EnvironmentSettings, race_detection: bool) -> Self {
        Self {
            environment,
            race_detection,
        }
    }

    /// Spawns `argv` for the service `name`.
    pub fn spawn(
        &self,
        name: &str,
        argv: &[String],
        clock_override: Option<&str>,
    ) -> Result<ManagedProcess, SpawnError> {
        let Some((program, arguments)) = argv.split_first() else {
            return Err(SpawnError::EmptyCommand {
                name: name.to_owned(),
            });
        };
        let mut command = Command::new(program);
        command.args(arguments);
        for (key, value) in self.overlay(clock_override, |key| env::var_os(key).is_some()) {
            command.env(key, value);
        }
        let child = command.spawn().map_err(|source| SpawnError::Launch {
            name: name.to_owned(),
            program: program.clone(),
            source,
        })?;
        info!(
            target: PROCESS_TARGET,
            service = name,
            pid = child.id(),
            command = %argv.join(" "),
            "spawned service process"
        );
        Ok(ManagedProcess::new(name, argv.to_vec(), child))
    }

    /// Variables to export, skipping those `is_set` reports as present.
    fn overlay<F>(&self, clock_override: Option<&str>, is_set: F) -> Vec<(String, String)>
    where
        F: Fn(&str) -> bool,
    {
        let mut variables = Vec::new();
        if self.race_detection {
            variables.push((
                self.environment.race_variable.clone(),
                self.environment.race_value.clone(),
            ));
        }
        if let Some(clock) = clock_override {
            variables.push((self.environment.clock_variable.clone(), clock.to_owned()));
        }
        variables.retain(|(key, _)| !is_set(key));
        variables
    }
}
