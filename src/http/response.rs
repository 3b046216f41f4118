//! Fallback responses for requests no route accepts.
//!
//! # Design Decisions
//! - These run last in the not-found / method-not-allowed chains, after the
//!   global middleware and any user chain
//! - A user chain that already wrote a response wins; the fallback is silent

use axum::http::{header, HeaderValue, StatusCode};

use crate::http::context::{handler, Context, Handler};

/// Terminal handler answering `404 Not Found`.
pub fn not_found() -> Handler {
    handler(|ctx| respond_unrouted(ctx, StatusCode::NOT_FOUND))
}

/// Terminal handler answering `405 Method Not Allowed`.
pub fn method_not_allowed() -> Handler {
    handler(|ctx| respond_unrouted(ctx, StatusCode::METHOD_NOT_ALLOWED))
}

fn respond_unrouted(ctx: &mut Context, status: StatusCode) {
    if ctx.written() {
        return;
    }
    let body = if status == StatusCode::METHOD_NOT_ALLOWED {
        "Method Not Allowed"
    } else {
        "Not Found"
    };
    ctx.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    ctx.write_status(status);
    ctx.write(body.as_bytes());
}
