//! The status reporter: gateway liveness and configured addresses.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::http::server::AppState;
use crate::upstream::{Registry, UpstreamName};

/// Snapshot returned by `/api/status`. Static data only; never fails.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub timestamp: String,
    pub car_ip: String,
    pub cam_ip: String,
}

/// Build a status snapshot from the registry.
pub fn report(registry: &Registry) -> StatusReport {
    StatusReport {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
        car_ip: registry.resolve(UpstreamName::Controller).host.clone(),
        cam_ip: registry.resolve(UpstreamName::Camera).host.clone(),
    }
}

/// `GET /api/status`
///
/// Carries the same CORS header as the proxied routes so a cross-origin
/// dashboard can poll it.
pub async fn status_handler(
    State(state): State<AppState>,
) -> ([(axum::http::HeaderName, &'static str); 1], Json<StatusReport>) {
    (
        [(axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(report(&state.registry)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamsConfig;

    #[test]
    fn test_report_echoes_configured_addresses() {
        let registry = Registry::from_config(&UpstreamsConfig {
            controller: "10.2.0.1:8000".into(),
            camera: "10.2.0.2".into(),
        });
        let report = report(&registry);
        assert_eq!(report.status, "OK");
        assert_eq!(report.car_ip, "10.2.0.1:8000");
        assert_eq!(report.cam_ip, "10.2.0.2");
        assert!(!report.timestamp.is_empty());
    }
}
