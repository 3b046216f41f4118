//! HTTP request router built on a compressed prefix tree.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::{handler, Context, Engine, EngineOptions, Handler, HttpServer, RouteGroup};
pub use lifecycle::{Shutdown, ShutdownKind};
pub use routing::{Method, Params, RouteError, RouteTable, Tree};
