//! Proxy subsystem: the forwarding primitive and its stream specialization.
//!
//! # Data Flow
//! ```text
//! matched RouteEntry + inbound request
//!     → engine.rs (URI rewrite, Host drop, bounded send)
//!     → command route: policy headers + idle-bounded body relay
//!     → stream route:  relay.rs (forced no-cache headers, unbounded relay)
//!     → error.rs (uniform 500 conversion at the session boundary)
//! ```

pub mod engine;
pub mod error;
pub mod relay;

pub use engine::{build_client, forward, HttpClient};
pub use error::ProxyError;
pub use relay::relay;
