//! trie-router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum + tower-http (timeout, trace, body limit)
//!                          │
//!                          ▼
//!                     Engine::handle
//!                          │  RouteTable (one compressed trie per method)
//!                          ▼
//!                     handler chain: recovery → request id → access log
//!                                    → group handlers → route handler
//!                          │
//!     Client Response ◀────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use trie_router::config::{loader, load_config, ServerConfig};
use trie_router::lifecycle::{build_engine, runtime, signals, Shutdown};
use trie_router::observability::logging;
use trie_router::HttpServer;

#[derive(Parser)]
#[command(name = "trie-router", version)]
#[command(about = "HTTP server dispatching through a compressed trie router", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    runtime::run(serve(args))?
}

async fn serve(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = ServerConfig::default();
            loader::apply_env_overrides(&mut config);
            config
        }
    };

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "trie-router starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        handle_method_not_allowed = config.routing.handle_method_not_allowed,
        "Configuration loaded"
    );

    let engine = build_engine(&config).inspect_err(|e| {
        tracing::error!(error = %e, "Route registration failed");
    })?;
    for (method, pattern) in engine.routes() {
        tracing::info!(%method, %pattern, "Route");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::listen(Arc::clone(&shutdown)));

    HttpServer::new(config, engine).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
