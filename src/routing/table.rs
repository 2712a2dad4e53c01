//! The route table: public paths bound to upstream paths.
//!
//! # Responsibilities
//! - Declare every public route from the fixed command lists
//! - Look up the entry for an inbound (method, path) pair
//! - Carry the per-route response policy (CORS, caching, content type)
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact-path lookup via HashMap; no prefix or regex matching
//! - Building the table is a pure function of the fixed command lists
//! - CORS is injected uniformly on every route, including error responses

use axum::http::Method;
use std::collections::HashMap;

use crate::upstream::UpstreamName;

/// Motor commands exposed by the controller firmware.
const MOTOR_COMMANDS: [&str; 5] = ["forward", "backward", "left", "right", "stop"];

/// Valve commands exposed by the controller firmware.
const VALVE_COMMANDS: [&str; 4] = ["valve1_on", "valve1_off", "valve2_on", "valve2_off"];

/// Headers that make browsers treat the MJPEG stream as live, never cached.
pub const STREAM_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Fallback content type for the camera stream. The deployed firmware omits
/// (or truncates) its multipart content type, so the boundary it actually
/// uses is pinned here; an upstream that reports a complete multipart type
/// wins over this constant.
pub const STREAM_CONTENT_TYPE: &str =
    "multipart/x-mixed-replace; boundary=123456789000000000000987654321";

/// Response-header policy applied over the upstream's headers.
#[derive(Debug, Clone, Copy)]
pub struct ResponsePolicy {
    /// Value for `Access-Control-Allow-Origin`. Always injected.
    pub cors_origin: &'static str,
    /// Replacement `Cache-Control` value, if any.
    pub cache_control: Option<&'static str>,
    /// Content type to apply when the upstream's own is absent or unusable.
    pub content_type_override: Option<&'static str>,
}

impl ResponsePolicy {
    /// Policy for short-lived command and sensor routes.
    fn command() -> Self {
        Self {
            cors_origin: "*",
            cache_control: None,
            content_type_override: None,
        }
    }

    /// Policy for the camera stream route.
    fn stream() -> Self {
        Self {
            cors_origin: "*",
            cache_control: Some(STREAM_CACHE_CONTROL),
            content_type_override: Some(STREAM_CONTENT_TYPE),
        }
    }
}

/// One public route bound to an upstream path.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Public path, e.g. "/api/forward".
    pub public_path: String,
    /// Which device serves this route.
    pub upstream: UpstreamName,
    /// Path on the device, e.g. "/forward".
    pub upstream_path: String,
    /// Only GET routes exist today.
    pub method: Method,
    /// Header overrides applied to the relayed response.
    pub policy: ResponsePolicy,
    /// True for unbounded multipart relays (the camera stream).
    pub streaming: bool,
}

/// Exact-path routing table, built once at startup.
#[derive(Debug)]
pub struct RouteTable {
    entries: HashMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build the table from the fixed command lists.
    ///
    /// Pure and idempotent. Public paths are unique by construction; a
    /// duplicate would be a programming error in the command lists, caught
    /// at startup.
    pub fn build() -> Self {
        let mut entries = HashMap::new();

        let mut insert = |entry: RouteEntry| {
            let previous = entries.insert(entry.public_path.clone(), entry);
            assert!(previous.is_none(), "duplicate public path in route table");
        };

        for command in MOTOR_COMMANDS.iter().chain(VALVE_COMMANDS.iter()) {
            insert(RouteEntry {
                public_path: format!("/api/{command}"),
                upstream: UpstreamName::Controller,
                upstream_path: format!("/{command}"),
                method: Method::GET,
                policy: ResponsePolicy::command(),
                streaming: false,
            });
        }

        insert(RouteEntry {
            public_path: "/api/sensor".into(),
            upstream: UpstreamName::Controller,
            upstream_path: "/sensor".into(),
            method: Method::GET,
            policy: ResponsePolicy::command(),
            streaming: false,
        });

        insert(RouteEntry {
            public_path: "/api/stream".into(),
            upstream: UpstreamName::Camera,
            upstream_path: "/stream".into(),
            method: Method::GET,
            policy: ResponsePolicy::stream(),
            streaming: true,
        });

        Self { entries }
    }

    /// Look up the route for an inbound request. Exact-path equality;
    /// anything else falls through to the default handler.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        let entry = self.entries.get(path)?;
        if entry.method == *method {
            Some(entry)
        } else {
            None
        }
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no routes are registered (never, in practice).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_all_fixed_routes() {
        let table = RouteTable::build();
        // 5 motor + 4 valve + sensor + stream
        assert_eq!(table.len(), 11);

        for command in MOTOR_COMMANDS.iter().chain(VALVE_COMMANDS.iter()) {
            let entry = table
                .match_route(&Method::GET, &format!("/api/{command}"))
                .unwrap_or_else(|| panic!("missing route for {command}"));
            assert_eq!(entry.upstream, UpstreamName::Controller);
            assert_eq!(entry.upstream_path, format!("/{command}"));
            assert!(!entry.streaming);
        }
    }

    #[test]
    fn test_stream_route_targets_camera() {
        let table = RouteTable::build();
        let entry = table.match_route(&Method::GET, "/api/stream").unwrap();
        assert_eq!(entry.upstream, UpstreamName::Camera);
        assert_eq!(entry.upstream_path, "/stream");
        assert!(entry.streaming);
        assert_eq!(entry.policy.cache_control, Some(STREAM_CACHE_CONTROL));
        assert_eq!(entry.policy.content_type_override, Some(STREAM_CONTENT_TYPE));
    }

    #[test]
    fn test_matching_is_exact_path_only() {
        let table = RouteTable::build();
        assert!(table.match_route(&Method::GET, "/api/forward/extra").is_none());
        assert!(table.match_route(&Method::GET, "/api/forwar").is_none());
        assert!(table.match_route(&Method::GET, "/forward").is_none());
        assert!(table.match_route(&Method::GET, "/").is_none());
    }

    #[test]
    fn test_non_get_does_not_match() {
        let table = RouteTable::build();
        assert!(table.match_route(&Method::POST, "/api/forward").is_none());
        assert!(table.match_route(&Method::DELETE, "/api/stream").is_none());
    }

    #[test]
    fn test_cors_is_uniform_across_routes() {
        let table = RouteTable::build();
        for path in ["/api/forward", "/api/valve1_on", "/api/sensor", "/api/stream"] {
            let entry = table.match_route(&Method::GET, path).unwrap();
            assert_eq!(entry.policy.cors_origin, "*");
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let a = RouteTable::build();
        let b = RouteTable::build();
        assert_eq!(a.len(), b.len());
    }
}
