//! Error surface for spawning and terminating service processes.

use std::io;

use thiserror::Error;

/// Errors raised while launching a service process.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The descriptor carried no program to run.
    #[error("service '{name}' has an empty command")]
    EmptyCommand { name: String },
    /// The operating system refused to start the program.
    #[error("failed to spawn '{program}' for service '{name}': {source}")]
    Launch {
        name: String,
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while polling, signalling, or reaping a service process.
#[derive(Debug, Error)]
pub enum TerminateError {
    /// Querying the exit status failed.
    #[error("failed to poll pid {pid}: {source}")]
    Poll {
        pid: u32,
        #[source]
        source: io::Error,
    },
    /// The pid does not fit the platform's signed pid type.
    #[error("pid {pid} cannot be signalled on this platform")]
    InvalidPid { pid: u32 },
    /// Delivering SIGTERM failed.
    #[cfg(unix)]
    #[error("failed to send SIGTERM to pid {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::errno::Errno,
    },
    /// Killing the process failed on platforms without signals.
    #[cfg(not(unix))]
    #[error("failed to kill pid {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: io::Error,
    },
    /// Waiting for the process to exit failed.
    #[error("failed to wait for pid {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },
}
