//! Proxy error taxonomy and the single response-writing path.
//!
//! # Design Decisions
//! - Every upstream-communication failure is caught at the session boundary
//!   and converted to a client-visible 500; nothing crashes the process
//! - Command routes get machine-readable JSON errors; the stream route gets
//!   plain text since it may render inside an <img> fallback
//! - CORS is injected on error responses too, matching success responses

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use serde_json::json;
use thiserror::Error;

/// Failure modes of a single forwarded exchange.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// TCP connect failed, DNS failed, or the host is unreachable.
    #[error("upstream for {route} unreachable: {source}")]
    UpstreamUnreachable {
        route: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The upstream accepted the connection but response headers never came.
    #[error("upstream for {route} timed out")]
    UpstreamTimeout { route: String },

    /// The upstream dropped the connection mid-response.
    #[error("upstream for {route} reset the connection")]
    UpstreamReset { route: String },

    /// Forwarding URI could not be built. Startup validation makes this
    /// unreachable in practice; kept as an explicit variant rather than a
    /// panic path.
    #[error("invalid upstream uri for {route}: {source}")]
    BadUpstreamUri {
        route: String,
        #[source]
        source: axum::http::Error,
    },
}

impl ProxyError {
    /// Public route the failed exchange belonged to.
    pub fn route(&self) -> &str {
        match self {
            ProxyError::UpstreamUnreachable { route, .. }
            | ProxyError::UpstreamTimeout { route }
            | ProxyError::UpstreamReset { route }
            | ProxyError::BadUpstreamUri { route, .. } => route,
        }
    }

    /// Convert into the 500 response the client sees.
    ///
    /// `streaming` picks the body format: JSON for command routes, plain
    /// text for the stream route.
    pub fn into_client_response(self, streaming: bool) -> Response {
        let builder = Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );

        let result = if streaming {
            builder
                .header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
                .body(Body::from(format!("stream unavailable: {}", self)))
        } else {
            let payload = json!({ "error": self.to_string() });
            builder
                .header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )
                .body(Body::from(payload.to_string()))
        };

        // The builder only fails on invalid header values, and all values
        // here are static.
        result.unwrap_or_else(|_| Response::new(Body::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_is_json_with_error_field() {
        let err = ProxyError::UpstreamTimeout {
            route: "/api/sensor".into(),
        };
        let response = err.into_client_response(false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[test]
    fn test_stream_error_is_plain_text() {
        let err = ProxyError::UpstreamTimeout {
            route: "/api/stream".into(),
        };
        let response = err.into_client_response(true);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }

    #[test]
    fn test_route_accessor() {
        let err = ProxyError::UpstreamReset {
            route: "/api/forward".into(),
        };
        assert_eq!(err.route(), "/api/forward");
    }
}
