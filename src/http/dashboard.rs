//! Minimal built-in status page served at `/`.
//!
//! Embeds the live camera stream and shows the two configured device
//! addresses. A richer dashboard can be dropped into `static_dir`; this page
//! is what you get with zero extra files.

use axum::{extract::State, response::Html};

use crate::http::server::AppState;
use crate::upstream::UpstreamName;

/// `GET /`
pub async fn dashboard_handler(State(state): State<AppState>) -> Html<String> {
    let controller = &state.registry.resolve(UpstreamName::Controller).host;
    let camera = &state.registry.resolve(UpstreamName::Camera).host;
    Html(render(controller, camera))
}

fn render(controller: &str, camera: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Rover Gateway</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; background: #111; color: #ddd; }}
    img {{ max-width: 640px; border: 1px solid #444; }}
    code {{ color: #8c8; }}
  </style>
</head>
<body>
  <h1>Rover Gateway</h1>
  <img src="/api/stream" alt="camera stream">
  <p>Controller: <code>{controller}</code></p>
  <p>Camera: <code>{camera}</code></p>
</body>
</html>
"#
    )
}
