//! Lifecycle management subsystem.
//!
//! # Design Decisions
//! - Startup order: config first, then registry/table, then the listener
//! - Shutdown: stop accepting, drain in-flight sessions, exit

pub mod shutdown;

pub use shutdown::Shutdown;
