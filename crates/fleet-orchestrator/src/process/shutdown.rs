//! Termination-signal routing.
//!
//! A listener thread blocks on a [`ShutdownSignal`] and cancels a shared
//! [`ShutdownToken`]. The thread that owns the fleet observes the token and
//! performs the shutdown itself, so process handles never cross threads.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{info, warn};

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that waits for termination signals.
///
/// Handlers are registered by [`SystemShutdownSignal::install`], so signals
/// that arrive before anyone waits are still observed.
#[derive(Debug)]
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
}

impl SystemShutdownSignal {
    /// Registers handlers for SIGTERM, SIGINT, SIGQUIT, and SIGHUP.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            signals: Mutex::new(signals),
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = self
            .signals
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(signal) = signals.forever().next() {
            info!(target: PROCESS_TARGET, signal, "shutdown signal received");
        }
        Ok(())
    }
}

/// Cooperative cancellation flag shared between the signal listener and the
/// fleet controller.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Spawns a thread that cancels `token` once `signal` fires.
///
/// The token is cancelled even when waiting fails, so the fleet is never left
/// running without a way to stop it.
pub fn spawn_listener<S>(signal: S, token: ShutdownToken) -> JoinHandle<Result<(), ShutdownError>>
where
    S: ShutdownSignal + 'static,
{
    thread::spawn(move || {
        let outcome = signal.wait();
        if let Err(error) = &outcome {
            warn!(target: PROCESS_TARGET, %error, "shutdown listener failed");
        }
        token.cancel();
        outcome
    })
}
