use std::fmt;
use std::future::{self, Future};
use std::io;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};

use crate::db::client::DbClient;

/// Termination signals that trigger a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub fn name(self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Routes both shutdown triggers to the client's one-shot disconnect.
///
/// Either trigger may fire first, both may fire, and either may fire more
/// than once; only the first one closes the pool.
#[derive(Debug, Clone)]
pub struct ShutdownController {
    client: Arc<DbClient>,
}

impl ShutdownController {
    pub fn new(client: Arc<DbClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<DbClient> {
        &self.client
    }

    /// The process is about to exit on its own.
    pub async fn before_exit(&self) {
        if self.client.env().is_dev() {
            info!("db_lifecycle=before_exit action=disconnect");
        }
        self.client.disconnect().await;
    }

    /// A termination signal arrived and nothing is left to drain.
    pub async fn on_signal(&self, signal: ShutdownSignal) {
        self.on_signal_after(signal, future::ready(())).await;
    }

    /// A termination signal arrived while requests may still be in flight.
    ///
    /// The pool stays open until `drain` completes.
    pub async fn on_signal_after<D>(&self, signal: ShutdownSignal, drain: D)
    where
        D: Future<Output = ()>,
    {
        warn!(signal = signal.name(), "Received {signal}, disconnecting database client");
        drain.await;
        self.client.disconnect().await;
    }
}

/// How a graceful shutdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Drained,
    /// Another signal arrived before the drain finished
    Interrupted(ShutdownSignal),
}

/// Run `shutdown` to completion unless `second_signal` fires first.
///
/// A listener that fails to install never interrupts the drain.
pub async fn drain_or_abort<D, S>(shutdown: D, second_signal: S) -> DrainOutcome
where
    D: Future<Output = ()>,
    S: Future<Output = io::Result<ShutdownSignal>>,
{
    let second = async {
        match second_signal.await {
            Ok(signal) => signal,
            Err(_) => future::pending().await,
        }
    };

    tokio::select! {
        () = shutdown => DrainOutcome::Drained,
        signal = second => DrainOutcome::Interrupted(signal),
    }
}

/// Wait for SIGINT or (on unix) SIGTERM, whichever arrives first.
pub async fn wait_for_signal() -> io::Result<ShutdownSignal> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            res = signal::ctrl_c() => res.map(|()| ShutdownSignal::Interrupt),
            _ = terminate.recv() => Ok(ShutdownSignal::Terminate),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        Ok(ShutdownSignal::Interrupt)
    }
}
