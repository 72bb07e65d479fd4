//! Process signal handling.

use std::io;

/// What the daemon should do about a received signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Drain sessions and exit.
    Shutdown(&'static str),
    /// Re-read the registry now.
    Refresh,
}

/// Listens for SIGINT, SIGTERM and SIGHUP.
#[cfg(unix)]
pub struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    /// Install the handlers. Signals arriving afterwards are queued.
    pub fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the next signal.
    pub async fn recv(&mut self) -> Signal {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Signal::Shutdown("SIGINT"),
            Some(()) = self.terminate.recv() => Signal::Shutdown("SIGTERM"),
            Some(()) = self.hangup.recv() => Signal::Refresh,
            else => Signal::Shutdown("signal stream closed"),
        }
    }
}

/// Listens for Ctrl+C.
#[cfg(not(unix))]
pub struct Signals;

#[cfg(not(unix))]
impl Signals {
    /// Install the handler.
    pub fn new() -> io::Result<Self> {
        Ok(Self)
    }

    /// Wait for the next signal.
    pub async fn recv(&mut self) -> Signal {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Signal::Shutdown("ctrl-c"),
            Err(_) => Signal::Shutdown("signal stream closed"),
        }
    }
}
