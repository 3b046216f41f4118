//! Request ID propagation.

use axum::http::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::http::context::{handler, Handler};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request identifier, stored in the context extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Reuse the caller's `x-request-id` or mint a UUID v4, expose it to later
/// handlers and echo it on the response.
pub fn request_id() -> Handler {
    handler(|ctx| {
        let id = ctx
            .header(X_REQUEST_ID)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&id) {
            ctx.set_header(HeaderName::from_static(X_REQUEST_ID), value);
        }
        ctx.extensions_mut().insert(RequestId(id));
        ctx.next();
    })
}
