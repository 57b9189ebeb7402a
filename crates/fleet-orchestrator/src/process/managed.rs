//! Handles for spawned service processes.

use std::fmt;
use std::process::{Child, ExitStatus};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{Signal, kill};
#[cfg(unix)]
use nix::unistd::Pid;
use tracing::debug;

use super::PROCESS_TARGET;
use super::errors::TerminateError;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// Normal exit with a status code.
    Code(i32),
    /// Terminated by a signal.
    Signal(i32),
    /// The platform reported neither a code nor a signal.
    Unknown,
}

impl ProcessExit {
    /// True for a zero exit code.
    #[must_use]
    pub fn success(self) -> bool {
        matches!(self, Self::Code(0))
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signal(signal);
            }
        }
        Self::Unknown
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(formatter, "exit code {code}"),
            Self::Signal(signal) => write!(formatter, "signal {signal}"),
            Self::Unknown => formatter.write_str("unknown status"),
        }
    }
}

/// A spawned service process owned by the fleet controller.
///
/// The exit status is recorded the first time termination is observed and
/// never changes afterwards.
#[derive(Debug)]
pub struct ManagedProcess {
    name: String,
    argv: Vec<String>,
    child: Child,
    exit: Option<ProcessExit>,
}

impl ManagedProcess {
    pub(crate) fn new(name: impl Into<String>, argv: Vec<String>, child: Child) -> Self {
        Self {
            name: name.into(),
            argv,
            child,
            exit: None,
        }
    }

    /// Descriptor name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Command used to spawn the process.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    #[must_use]
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Exit status, once observed.
    #[must_use]
    pub fn exit(&self) -> Option<ProcessExit> {
        self.exit
    }

    /// Returns the exit status if the process has terminated, without
    /// blocking.
    pub fn poll(&mut self) -> Result<Option<ProcessExit>, TerminateError> {
        if let Some(exit) = self.exit {
            return Ok(Some(exit));
        }
        let pid = self.pid();
        let status = self
            .child
            .try_wait()
            .map_err(|source| TerminateError::Poll { pid, source })?;
        Ok(status.map(|status| self.record(status)))
    }

    /// Asks a live process to stop with SIGTERM and blocks until it exits.
    ///
    /// A process that already exited is only reaped.
    pub fn terminate(&mut self) -> Result<ProcessExit, TerminateError> {
        if let Some(exit) = self.poll()? {
            return Ok(exit);
        }
        self.request_termination()?;
        let pid = self.pid();
        debug!(
            target: PROCESS_TARGET,
            service = %self.name,
            pid,
            "waiting for process to exit"
        );
        let status = self
            .child
            .wait()
            .map_err(|source| TerminateError::Wait { pid, source })?;
        Ok(self.record(status))
    }

    fn record(&mut self, status: ExitStatus) -> ProcessExit {
        *self.exit.get_or_insert_with(|| ProcessExit::from(status))
    }

    #[cfg(unix)]
    fn request_termination(&mut self) -> Result<(), TerminateError> {
        let pid = self.pid();
        let raw = i32::try_from(pid).map_err(|_| TerminateError::InvalidPid { pid })?;
        match kill(Pid::from_raw(raw), Signal::SIGTERM) {
            // The child exited between the poll and the signal; `wait` reaps it.
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(source) => Err(TerminateError::Signal { pid, source }),
        }
    }

    #[cfg(not(unix))]
    fn request_termination(&mut self) -> Result<(), TerminateError> {
        let pid = self.pid();
        self.child
            .kill()
            .map_err(|source| TerminateError::Kill { pid, source })
    }
}

/// A tracked process found dead by a liveness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    pub name: String,
    pub pid: u32,
    pub command: String,
    pub exit: ProcessExit,
}

impl ExitReport {
    pub(crate) fn new(process: &ManagedProcess, exit: ProcessExit) -> Self {
        Self {
            name: process.name().to_owned(),
            pid: process.pid(),
            command: process.command_line(),
            exit,
        }
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "'{}' with pid {} exited with {}",
            self.command, self.pid, self.exit
        )
    }
}
