//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the listener address parses as a socket address
//! - Check upstream addresses are bare HTTP authorities
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use axum::http::uri::Authority;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Config field the problem was found in (e.g. "upstreams.camera").
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".into(),
            message: format!(
                "not a valid socket address: {:?}",
                config.listener.bind_address
            ),
        });
    }

    check_authority(&mut errors, "upstreams.controller", &config.upstreams.controller);
    check_authority(&mut errors, "upstreams.camera", &config.upstreams.camera);

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.connect_secs".into(),
            message: "must be greater than zero".into(),
        });
    }
    if config.timeouts.idle_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.idle_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An upstream address must be a bare authority: no scheme, no path, and it
/// must be acceptable as the authority of an `http://` URI.
fn check_authority(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(ValidationError {
            field: field.into(),
            message: "must not be empty".into(),
        });
        return;
    }
    if value.contains("://") || value.contains('/') {
        errors.push(ValidationError {
            field: field.into(),
            message: format!("must be host[:port] without scheme or path: {:?}", value),
        });
        return;
    }
    if value.parse::<Authority>().is_err() {
        errors.push(ValidationError {
            field: field.into(),
            message: format!("not a valid host[:port] authority: {:?}", value),
        });
    }
}
