//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGQUIT, SIGINT, SIGTERM)
//! - Translate signals to [`ShutdownKind`] and trigger the coordinator
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGQUIT/SIGINT drain gracefully, SIGTERM stops immediately
//! - A second signal during a graceful drain escalates to immediate
//! - Non-unix targets only get Ctrl+C (graceful)

use std::sync::Arc;

use crate::lifecycle::shutdown::{Shutdown, ShutdownKind};

/// Wait for the next shutdown signal.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<ShutdownKind> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut quit = signal(SignalKind::quit())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let kind = tokio::select! {
        _ = quit.recv() => {
            tracing::info!(signal = "SIGQUIT", "Signal received");
            ShutdownKind::Graceful
        }
        _ = interrupt.recv() => {
            tracing::info!(signal = "SIGINT", "Signal received");
            ShutdownKind::Graceful
        }
        _ = terminate.recv() => {
            tracing::info!(signal = "SIGTERM", "Signal received");
            ShutdownKind::Immediate
        }
    };
    Ok(kind)
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<ShutdownKind> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(signal = "ctrl-c", "Signal received");
    Ok(ShutdownKind::Graceful)
}

/// Forward signals to `shutdown` until an immediate stop has been requested.
pub async fn listen(shutdown: Arc<Shutdown>) {
    let mut draining = false;
    loop {
        let kind = match wait_for_signal().await {
            Ok(_) if draining => ShutdownKind::Immediate,
            Ok(kind) => kind,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                return;
            }
        };
        shutdown.trigger(kind);
        if kind == ShutdownKind::Immediate {
            return;
        }
        draining = true;
    }
}
