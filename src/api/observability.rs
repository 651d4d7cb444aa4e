use crate::api::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    ClientError,
    Error,
}

impl Outcome {
    const fn from_status(status: u16) -> Self {
        match status {
            500.. => Self::Error,
            400..=499 => Self::ClientError,
            _ => Self::Success,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ClientError => "client_error",
            Self::Error => "error",
        }
    }
}

/// Route template when axum matched one; raw paths would explode label cardinality.
fn route_label(route: Option<&str>) -> &str {
    route.unwrap_or("unmatched")
}

fn record_http_metrics(method: &str, route: &str, status: u16, elapsed: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.to_string()),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

/// Opens the per-request span (the auth layer fills `user_id`) and emits one
/// wide event plus HTTP metrics when the response is ready.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        route = route.clone(),
        user_id = tracing::field::Empty,
    );

    async move {
        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();
        let outcome = Outcome::from_status(status);

        record_http_metrics(&method, route_label(route.as_deref()), status, elapsed);

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        if outcome == Outcome::Error {
            warn!(
                event = "http_request_finished",
                duration_ms,
                status_code = status,
                user_agent = %user_agent,
                outcome = outcome.as_str(),
                "Request failed"
            );
        } else {
            info!(
                event = "http_request_finished",
                duration_ms,
                status_code = status,
                user_agent = %user_agent,
                outcome = outcome.as_str(),
                "Request finished"
            );
        }

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
    ] {
        headers.insert(name, HeaderValue::from_static(value));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_buckets() {
        assert_eq!(Outcome::from_status(200), Outcome::Success);
        assert_eq!(Outcome::from_status(304), Outcome::Success);
        assert_eq!(Outcome::from_status(404), Outcome::ClientError);
        assert_eq!(Outcome::from_status(409), Outcome::ClientError);
        assert_eq!(Outcome::from_status(500), Outcome::Error);
        assert_eq!(Outcome::from_status(502).as_str(), "error");
    }

    #[test]
    fn test_route_label_collapses_unmatched() {
        assert_eq!(route_label(Some("/api/movies/{id}")), "/api/movies/{id}");
        assert_eq!(route_label(None), "unmatched");
    }
}
