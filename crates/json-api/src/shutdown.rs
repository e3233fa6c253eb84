//! Graceful shutdown on SIGINT/SIGTERM

use std::{fmt, io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
#[error("failed to install {signal} handler: {source}")]
pub(crate) struct ShutdownSignalError {
    signal: ShutdownSignal,
    #[source]
    source: io::Error,
}

/// Which signal asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

async fn interrupt() -> Result<ShutdownSignal, ShutdownSignalError> {
    signal::ctrl_c()
        .await
        .map_err(|source| ShutdownSignalError {
            signal: ShutdownSignal::Interrupt,
            source,
        })?;

    Ok(ShutdownSignal::Interrupt)
}

#[cfg(unix)]
async fn terminate() -> Result<ShutdownSignal, ShutdownSignalError> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(|source| ShutdownSignalError {
            signal: ShutdownSignal::Terminate,
            source,
        })?
        .recv()
        .await;

    Ok(ShutdownSignal::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> Result<ShutdownSignal, ShutdownSignalError> {
    std::future::pending().await
}

/// Resolve with the first stop signal delivered to the process.
pub(crate) async fn wait() -> Result<ShutdownSignal, ShutdownSignalError> {
    tokio::select! {
        received = interrupt() => received,
        received = terminate() => received,
    }
}

/// Stop accepting connections once a signal arrives, letting in-flight
/// requests drain for up to `grace`.
pub(crate) async fn listen(
    handle: ServerHandle,
    grace: Option<Duration>,
) -> Result<(), ShutdownSignalError> {
    let received = wait().await?;

    info!(
        signal = %received,
        grace_seconds = grace.map(|grace| grace.as_secs()),
        "shutting down"
    );

    handle.stop_graceful(grace);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_display_their_conventional_names() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT", "interrupt");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM", "terminate");
    }
}
