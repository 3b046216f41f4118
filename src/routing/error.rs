//! Registration-time routing errors.

use thiserror::Error;

/// Errors raised while building a route table.
///
/// These are configuration faults: they surface at startup and should abort
/// it. Resolving a path that has no route is not an error (see
/// [`Tree::resolve`](crate::routing::Tree::resolve)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Path does not satisfy the route syntax.
    #[error("malformed route {path:?}: {reason}")]
    Malformed { path: String, reason: &'static str },

    /// The exact pattern is already routable.
    #[error("route {path} has been registered")]
    Duplicate { path: String },

    /// Two different dynamic names bind the same position of the tree.
    #[error(
        "key {new_key} in new path {new_path} conflicts with existing key {existing_key} in existing path {existing_path}"
    )]
    Conflict {
        new_key: String,
        new_path: String,
        existing_key: String,
        existing_path: String,
    },

    /// A route was registered without any handler.
    #[error("route {path} has no handlers")]
    EmptyHandlers { path: String },
}

/// Result type for route registration.
pub type RouteResult<T> = Result<T, RouteError>;
