//! Rover Gateway library.
//!
//! A local network gateway exposing a stable HTTP control surface for a
//! small vehicle platform, reverse-proxying to a motion/actuator controller
//! and an MJPEG camera whose addresses are supplied at startup.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod proxy;
pub mod routing;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
