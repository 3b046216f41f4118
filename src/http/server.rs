//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router whose fallback hands every request to the engine
//! - Wire up tower middleware (timeout, tracing)
//! - Enforce the request body limit
//! - Serve until shutdown, draining or forcing as requested
//!
//! # Design Decisions
//! - Axum does no routing of its own; the trie is the only router
//! - Handler chains are synchronous and run on the blocking pool

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::engine::Engine;
use crate::lifecycle::ShutdownKind;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub max_body_bytes: usize,
}

pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig, engine: Engine) -> Self {
        let state = AppState {
            engine: Arc::new(engine),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered Axum router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server on `listener` until `shutdown` says otherwise.
    ///
    /// `Graceful` stops accepting and waits for in-flight requests, at most
    /// `timeouts.shutdown_grace_secs`. `Immediate` returns right away.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<ShutdownKind>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let (drain_tx, drain_rx) = oneshot::channel();
        let (force_tx, force_rx) = oneshot::channel();
        tokio::spawn(watch_shutdown(shutdown, grace, drain_tx, force_tx));

        let server = axum::serve(listener, self.router).with_graceful_shutdown(async move {
            if drain_rx.await.is_err() {
                std::future::pending::<()>().await;
            }
        });

        tokio::select! {
            result = server.into_future() => result?,
            Ok(()) = force_rx => {
                tracing::warn!("HTTP server stopped without draining");
                return Ok(());
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn watch_shutdown(
    mut shutdown: broadcast::Receiver<ShutdownKind>,
    grace: Duration,
    drain: oneshot::Sender<()>,
    force: oneshot::Sender<()>,
) {
    match next_kind(&mut shutdown).await {
        None => return,
        Some(ShutdownKind::Immediate) => {
            let _ = force.send(());
            return;
        }
        Some(ShutdownKind::Graceful) => {
            tracing::info!(grace_secs = grace.as_secs(), "Draining connections");
            let _ = drain.send(());
        }
    }

    tokio::select! {
        _ = tokio::time::sleep(grace) => {
            tracing::warn!("Grace period elapsed, forcing shutdown");
        }
        Some(ShutdownKind::Immediate) = next_kind(&mut shutdown) => {
            tracing::warn!("Immediate shutdown requested while draining");
        }
    }
    let _ = force.send(());
}

async fn next_kind(shutdown: &mut broadcast::Receiver<ShutdownKind>) -> Option<ShutdownKind> {
    loop {
        match shutdown.recv().await {
            Ok(kind) => return Some(kind),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// Fallback handler: every request goes through the engine.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    // Read failures other than the limit (client gone) get the same answer;
    // nobody is left to read it.
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(path = %parts.uri.path(), error = %e, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    let engine = Arc::clone(&state.engine);
    match tokio::task::spawn_blocking(move || engine.handle(parts, body)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Handler chain failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
