//! Upstream device registry.

pub mod registry;

pub use registry::{Registry, UpstreamName, UpstreamTarget};
