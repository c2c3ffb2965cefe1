// src/server/shutdown.rs
use anyhow::{Context, Result};
use std::future::Future;
use tokio::signal;

/// Registers the termination handlers and returns a future that resolves on
/// the first Ctrl+C or SIGTERM. Registration errors surface here, at startup.
pub fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("Failed to install SIGTERM handler")?;

    Ok(async move {
        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!(%err, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            terminate.recv().await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let received = tokio::select! {
            _ = ctrl_c => "ctrl-c",
            _ = terminate => "terminate",
        };
        tracing::info!(signal = received, "Shutdown signal received");
    })
}
