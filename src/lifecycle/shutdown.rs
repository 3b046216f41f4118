//! Shutdown coordination for the server.

use tokio::sync::broadcast;

/// How the server should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownKind {
    /// Stop accepting, drain in-flight requests (bounded by the grace period).
    Graceful,
    /// Stop now, dropping open connections.
    Immediate,
}

/// Coordinator for shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
/// A graceful shutdown may later be escalated by triggering `Immediate`.
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownKind>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownKind> {
        self.tx.subscribe()
    }

    pub fn trigger(&self, kind: ShutdownKind) {
        tracing::info!(kind = ?kind, "Shutdown triggered");
        let _ = self.tx.send(kind);
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
