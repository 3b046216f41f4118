//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (route registration, dispatch misses, access log)
//!
//! logging.rs installs the subscriber:
//!     → EnvFilter (RUST_LOG or configured level)
//!     → stdout, pretty or JSON
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID is attached by middleware and echoed to clients

pub mod logging;
