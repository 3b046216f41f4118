//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated [`ServerConfig`] into a ready [`Engine`]
//! - Install the global middleware in a fixed order
//! - Register the built-in and configured routes
//!
//! # Design Decisions
//! - Fail fast: any registration error is fatal
//! - Recovery runs outermost so it also covers the other middleware

use std::time::Duration;

use axum::http::StatusCode;
use serde::Serialize;

use crate::config::{RouteConfig, ServerConfig};
use crate::http::middleware::{logger, recovery, request_id, LoggerConfig};
use crate::http::{Context, Engine, EngineOptions};
use crate::routing::{Method, Params, RouteError, RouteResult};

pub const HEALTH_PATH: &str = "/healthz";

/// Build the engine served by `trie-router`.
pub fn build_engine(config: &ServerConfig) -> RouteResult<Engine> {
    let mut engine = Engine::new(EngineOptions {
        handle_method_not_allowed: config.routing.handle_method_not_allowed,
    });

    engine.use_middleware(recovery());
    engine.use_middleware(request_id());
    if config.observability.access_log {
        engine.use_middleware(logger(LoggerConfig {
            slow_threshold: config.observability.slow_request_ms.map(Duration::from_millis),
        }));
    }

    engine.get(HEALTH_PATH, health)?;
    for route in &config.routes {
        register_echo(&mut engine, route)?;
    }

    tracing::info!(routes = engine.routes().len(), "Engine built");
    Ok(engine)
}

fn health(ctx: &mut Context) {
    ctx.string(StatusCode::OK, "ok");
}

#[derive(Serialize)]
struct Echo<'a> {
    name: Option<&'a str>,
    method: &'a str,
    pattern: &'a str,
    path: &'a str,
    params: &'a Params,
}

fn register_echo(engine: &mut Engine, route: &RouteConfig) -> RouteResult<()> {
    let method: Method = route.method.parse().map_err(|_| RouteError::Malformed {
        path: route.path.clone(),
        reason: "unsupported method",
    })?;
    let name = route.name.clone();
    let pattern = route.path.clone();

    engine.route(method, &route.path, move |ctx| {
        let path = ctx.path().to_string();
        let body = Echo {
            name: name.as_deref(),
            method: method.as_str(),
            pattern: &pattern,
            path: &path,
            params: ctx.params(),
        };
        let rendered = match serde_json::to_value(&body) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render echo response");
                ctx.string(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
                return;
            }
        };
        if let Err(e) = ctx.json(StatusCode::OK, &rendered) {
            tracing::error!(error = %e, "Failed to render echo response");
        }
    })
}
