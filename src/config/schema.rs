//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Addresses of the two upstream devices.
    pub upstreams: UpstreamsConfig,

    /// Timeout configuration for upstream exchanges.
    pub timeouts: TimeoutConfig,

    /// Optional directory of static assets served for unmatched paths.
    pub static_dir: Option<PathBuf>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Network addresses of the embedded devices.
///
/// Each value is a host or host:port authority (e.g. "192.168.4.20:81"),
/// no scheme; the gateway only speaks plain HTTP to the devices.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamsConfig {
    /// Motion/actuator controller address.
    pub controller: String,

    /// Camera streaming device address.
    pub camera: String,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            controller: "192.168.4.20".to_string(),
            camera: "192.168.4.21".to_string(),
        }
    }
}

/// Timeouts applied to each upstream exchange.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP connect timeout towards an upstream, in seconds.
    pub connect_secs: u64,

    /// Idle timeout: bounds the wait for response headers and, on command
    /// routes, the gap between body chunks. Not applied to the unbounded
    /// camera stream body.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            idle_secs: 10,
        }
    }
}
