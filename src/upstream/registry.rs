//! The upstream registry: which device lives at which address.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Both device names are always registered, so resolution is infallible;
//!   address validity is enforced by config validation before the registry
//!   is ever built
//! - Reconfiguration requires a process restart

use crate::config::UpstreamsConfig;

/// The two devices the gateway forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamName {
    /// Motion/actuator controller.
    Controller,
    /// Camera streaming device.
    Camera,
}

impl std::fmt::Display for UpstreamName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamName::Controller => write!(f, "controller"),
            UpstreamName::Camera => write!(f, "camera"),
        }
    }
}

/// An upstream device address. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub name: UpstreamName,
    /// Host or host:port authority, no scheme.
    pub host: String,
    /// Always "http"; the devices do not speak TLS.
    pub scheme: &'static str,
}

/// Read-only mapping from device name to target address.
#[derive(Debug, Clone)]
pub struct Registry {
    controller: UpstreamTarget,
    camera: UpstreamTarget,
}

impl Registry {
    /// Build the registry from validated configuration.
    pub fn from_config(upstreams: &UpstreamsConfig) -> Self {
        Self {
            controller: UpstreamTarget {
                name: UpstreamName::Controller,
                host: upstreams.controller.clone(),
                scheme: "http",
            },
            camera: UpstreamTarget {
                name: UpstreamName::Camera,
                host: upstreams.camera.clone(),
                scheme: "http",
            },
        }
    }

    /// Resolve a device name to its configured target.
    pub fn resolve(&self, name: UpstreamName) -> &UpstreamTarget {
        match name {
            UpstreamName::Controller => &self.controller,
            UpstreamName::Camera => &self.camera,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_returns_configured_hosts() {
        let registry = Registry::from_config(&UpstreamsConfig {
            controller: "10.1.1.1:8000".into(),
            camera: "10.1.1.2:81".into(),
        });

        let controller = registry.resolve(UpstreamName::Controller);
        assert_eq!(controller.host, "10.1.1.1:8000");
        assert_eq!(controller.scheme, "http");
        assert_eq!(controller.name, UpstreamName::Controller);

        assert_eq!(registry.resolve(UpstreamName::Camera).host, "10.1.1.2:81");
    }
}
