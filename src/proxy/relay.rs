//! Relay for the unbounded camera stream.
//!
//! # Responsibilities
//! - Forward `/api/stream` to the camera and relay the multipart body
//! - First upstream chunk reaches the client as soon as it arrives
//! - Force the no-cache header set browsers need for live MJPEG
//! - Keep the upstream's multipart boundary when it reports one; fall back
//!   to the pinned boundary when the firmware omits or truncates it
//! - End cleanly when either side disconnects, without leaking the other
//!
//! # Design Decisions
//! - No idle timeout on the body: a live stream may legitimately pause
//! - No reconnect on upstream drop; the client re-requests /api/stream
//! - Client disconnect drops the body stream, which tears down the camera
//!   connection (pooling is disabled, so nothing lingers)

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    response::Response,
};
use http_body_util::BodyDataStream;
use tokio_stream::StreamExt;

use crate::config::TimeoutConfig;
use crate::proxy::engine::{send_upstream, HttpClient};
use crate::proxy::error::ProxyError;
use crate::routing::{RouteEntry, STREAM_CONTENT_TYPE};
use crate::upstream::UpstreamTarget;

/// Relay an unbounded multipart stream from the camera to the client.
pub async fn relay(
    client: &HttpClient,
    target: &UpstreamTarget,
    route: &RouteEntry,
    request: Request<Body>,
    timeouts: TimeoutConfig,
) -> Result<Response, ProxyError> {
    let response = send_upstream(client, target, route, request, timeouts).await?;

    let (mut parts, body) = response.into_parts();

    let content_type = stream_content_type(parts.headers.get(header::CONTENT_TYPE), route);
    parts.headers.insert(header::CONTENT_TYPE, content_type);
    parts.headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(crate::routing::STREAM_CACHE_CONTROL),
    );
    parts.headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    parts.headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    parts.headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(route.policy.cors_origin),
    );
    // An unbounded relay must not advertise a length.
    parts.headers.remove(header::CONTENT_LENGTH);

    tracing::info!(route = %route.public_path, host = %target.host, "stream relay opened");

    // Chunk-by-chunk relay: each frame is forwarded the moment it arrives,
    // and a chunk is only pulled from the camera once the client has taken
    // the previous one (back-pressure for slow clients). An upstream error
    // or EOF ends the stream, which closes the client side; dropping the
    // stream on client disconnect closes the camera side.
    let route_name = route.public_path.clone();
    let relayed = BodyDataStream::new(body).map(move |item| match item {
        Ok(chunk) => Ok(chunk),
        Err(e) => {
            tracing::warn!(route = %route_name, error = %e, "stream upstream disconnected");
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, e))
        }
    });

    Ok(Response::from_parts(parts, Body::from_stream(relayed)))
}

/// Decide the relayed content type. A complete multipart type from the
/// upstream (with its real boundary) wins; anything else is replaced by the
/// pinned boundary agreed with the deployed firmware.
fn stream_content_type(upstream: Option<&HeaderValue>, route: &RouteEntry) -> HeaderValue {
    if let Some(value) = upstream {
        if let Ok(text) = value.to_str() {
            if text.starts_with("multipart/x-mixed-replace") && text.contains("boundary=") {
                return value.clone();
            }
        }
    }

    route
        .policy
        .content_type_override
        .map(HeaderValue::from_static)
        .unwrap_or_else(|| HeaderValue::from_static(STREAM_CONTENT_TYPE))
}
