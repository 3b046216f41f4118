//! Built-in middleware.
//!
//! Every middleware is an ordinary [`Handler`](crate::http::Handler): it does
//! its work, calls `ctx.next()` to run the rest of the chain, and may act again
//! once the chain returns.

pub mod logger;
pub mod recovery;
pub mod request_id;

pub use logger::{logger, LoggerConfig};
pub use recovery::recovery;
pub use request_id::{request_id, RequestId, X_REQUEST_ID};
