//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route dispatch)
//!     → /api/status → status.rs (local, static data)
//!     → /           → dashboard.rs (local HTML page)
//!     → /api/*      → route table → proxy engine / stream relay
//!     → anything else → static assets or 404
//! ```

pub mod dashboard;
pub mod server;
pub mod status;

pub use server::{AppState, GatewayServer};
pub use status::StatusReport;
