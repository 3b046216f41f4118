//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build engine → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     ShutdownKind broadcast → server stops accepting → drain or drop
//!
//! Runtime (runtime.rs):
//!     block_on(server) → teardown bounded by a deadline
//!
//! Signals (signals.rs):
//!     SIGQUIT/SIGINT → Graceful
//!     SIGTERM        → Immediate
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then engine, then listener
//! - Graceful shutdown has a deadline: forced after the grace period

pub mod runtime;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownKind};
pub use startup::build_engine;
