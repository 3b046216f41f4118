//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (method, pattern, handlers)
//!     → path.rs (syntax check)
//!     → table.rs (pick the method's tree)
//!     → tree.rs (insert, splitting nodes, conflict detection)
//!
//! Resolution (per request):
//!     (method, path)
//!     → table.rs (pick the method's tree)
//!     → tree.rs / node.rs (literal-first match with wildcard backtracking)
//!     → Return: Match { handlers, params } or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex: `:name` is the only dynamic form, one per segment
//! - Deterministic: same input always matches the same route
//! - Literal matches take priority over wildcard matches at every level

pub mod error;
pub mod node;
pub mod params;
pub mod path;
pub mod table;
pub mod tree;

pub use error::{RouteError, RouteResult};
pub use params::Params;
pub use path::{join_paths, validate_path};
pub use table::{Method, RouteTable, UnsupportedMethod};
pub use tree::{Match, Tree};
