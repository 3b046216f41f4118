//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum + tower layers, body limit)
//!     → engine.rs (route table lookup → handler chain)
//!     → context.rs (run chain: middleware/, group handlers, route handler)
//!     → response.rs (404 / 405 when nothing matched)
//!     → Send to client
//! ```

pub mod context;
pub mod engine;
pub mod group;
pub mod middleware;
pub mod response;
pub mod server;

pub use context::{handler, BindError, Context, Handler, HandlerChain};
pub use engine::{Dispatch, Engine, EngineOptions, Outcome};
pub use group::RouteGroup;
pub use middleware::{RequestId, X_REQUEST_ID};
pub use server::HttpServer;
