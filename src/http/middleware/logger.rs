//! Access logging.

use std::time::{Duration, Instant};

use crate::http::context::{handler, Handler};

/// Access log settings, passed explicitly to [`logger`].
#[derive(Debug, Clone, Default)]
pub struct LoggerConfig {
    /// Requests slower than this are logged at warn level.
    pub slow_threshold: Option<Duration>,
}

/// Emit one structured event per request once the chain has run.
pub fn logger(config: LoggerConfig) -> Handler {
    handler(move |ctx| {
        let start = Instant::now();
        ctx.next();
        let latency = start.elapsed();
        let latency_ms = whole_millis(latency);

        if config.slow_threshold.is_some_and(|limit| latency > limit) {
            tracing::warn!(
                method = %ctx.method(),
                path = %ctx.path(),
                status = ctx.status().as_u16(),
                latency_ms,
                "Slow request"
            );
        } else {
            tracing::info!(
                method = %ctx.method(),
                path = %ctx.path(),
                status = ctx.status().as_u16(),
                latency_ms,
                "Request completed"
            );
        }
    })
}

/// Milliseconds in `latency`, saturating at `u64::MAX`.
fn whole_millis(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}
