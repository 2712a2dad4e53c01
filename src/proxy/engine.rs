//! The forwarding primitive for short-lived command and sensor routes.
//!
//! # Responsibilities
//! - Rewrite the inbound path onto the upstream's authority (query preserved)
//! - Drop the client's Host header so the upstream sees its own host
//! - Issue the request on a pool-disabled client (fresh TCP per forward)
//! - Bound the response-header wait and the gap between body chunks
//! - Apply the route's response policy over the upstream headers
//! - Relay the body chunk-by-chunk, never buffering it whole
//!
//! # Design Decisions
//! - One connection per forward: embedded HTTP stacks keep stale pooled
//!   connections poorly, and request volume is tiny
//! - Timeout errors are distinct from connect errors
//! - No retries; retry policy belongs to the calling client

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request, Uri},
    response::Response,
};
use http_body_util::BodyDataStream;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use tokio_stream::StreamExt;

use crate::config::TimeoutConfig;
use crate::proxy::error::ProxyError;
use crate::routing::{ResponsePolicy, RouteEntry};
use crate::upstream::UpstreamTarget;

/// Shared upstream HTTP client. Shared for its executor and connector
/// settings only; pooling is disabled, so every forward opens a fresh
/// connection.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build the upstream client with the configured connect timeout and
/// connection reuse disabled.
pub fn build_client(timeouts: &TimeoutConfig) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(connector)
}

/// Forward one inbound request along its matched route.
///
/// On success the upstream's status and body stream through with the route's
/// response policy applied over the upstream headers. All failures are
/// returned as [`ProxyError`]; nothing here panics or crashes the session.
pub async fn forward(
    client: &HttpClient,
    target: &UpstreamTarget,
    route: &RouteEntry,
    request: Request<Body>,
    timeouts: TimeoutConfig,
) -> Result<Response, ProxyError> {
    let response = send_upstream(client, target, route, request, timeouts).await?;

    let (mut parts, body) = response.into_parts();
    apply_policy(&mut parts.headers, &route.policy);

    // Per-chunk idle bound: a stalled upstream terminates the relay instead
    // of pinning the session forever. Back-pressure is preserved since each
    // chunk is pulled only when the client side is ready for it.
    let route_name = route.public_path.clone();
    let idle = Duration::from_secs(timeouts.idle_secs);
    let relayed = BodyDataStream::new(body)
        .timeout(idle)
        .map(move |item| match item {
            Ok(Ok(chunk)) => Ok(chunk),
            Ok(Err(e)) => {
                tracing::warn!(route = %route_name, error = %e, "upstream dropped mid-body");
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, e))
            }
            Err(_elapsed) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "idle timeout between body chunks",
            )),
        });

    Ok(Response::from_parts(parts, Body::from_stream(relayed)))
}

/// Issue the rewritten request and wait (bounded) for response headers.
///
/// Shared by the command path and the stream relay; the two differ only in
/// how they treat the response once headers have arrived.
pub(crate) async fn send_upstream(
    client: &HttpClient,
    target: &UpstreamTarget,
    route: &RouteEntry,
    request: Request<Body>,
    timeouts: TimeoutConfig,
) -> Result<Response<hyper::body::Incoming>, ProxyError> {
    let (parts, body) = request.into_parts();

    let uri = upstream_uri(target, route, parts.uri.query()).map_err(|source| {
        ProxyError::BadUpstreamUri {
            route: route.public_path.clone(),
            source,
        }
    })?;

    let mut upstream_request = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .body(body)
        .map_err(|source| ProxyError::BadUpstreamUri {
            route: route.public_path.clone(),
            source,
        })?;

    // changeOrigin semantics: forward the client's headers but never its
    // Host, so firmware that validates Host sees its own authority (hyper
    // derives it from the URI).
    *upstream_request.headers_mut() = parts.headers;
    upstream_request.headers_mut().remove(header::HOST);

    tracing::debug!(
        route = %route.public_path,
        upstream = %target.name,
        host = %target.host,
        path = %route.upstream_path,
        "forwarding request"
    );

    let header_wait = Duration::from_secs(timeouts.idle_secs);
    match tokio::time::timeout(header_wait, client.request(upstream_request)).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(source)) => {
            if source.is_connect() {
                Err(ProxyError::UpstreamUnreachable {
                    route: route.public_path.clone(),
                    source,
                })
            } else {
                tracing::warn!(route = %route.public_path, error = %source, "upstream exchange failed");
                Err(ProxyError::UpstreamReset {
                    route: route.public_path.clone(),
                })
            }
        }
        Err(_elapsed) => Err(ProxyError::UpstreamTimeout {
            route: route.public_path.clone(),
        }),
    }
}

/// Rebuild the request URI in the upstream's path space. The public path is
/// replaced by the route's upstream path; the query string survives as-is.
fn upstream_uri(
    target: &UpstreamTarget,
    route: &RouteEntry,
    query: Option<&str>,
) -> Result<Uri, axum::http::Error> {
    let path_and_query = match query {
        Some(q) => format!("{}?{}", route.upstream_path, q),
        None => route.upstream_path.clone(),
    };

    Uri::builder()
        .scheme(target.scheme)
        .authority(target.host.as_str())
        .path_and_query(path_and_query)
        .build()
}

/// Apply the route's header overrides on top of whatever the upstream sent.
pub(crate) fn apply_policy(headers: &mut HeaderMap, policy: &ResponsePolicy) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(policy.cors_origin),
    );
    if let Some(cache_control) = policy.cache_control {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
    }
    if let Some(content_type) = policy.content_type_override {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
}
