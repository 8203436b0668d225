use crate::api::AppState;
use crate::constants::RESULTS_PATH;
use crate::domain::IndexRange;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Attached to a run response so the request log line names the run it served.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub range: IndexRange,
    pub outcome: &'static str,
}

/// Collapses request paths into a fixed label set for metrics.
///
/// Routing happens inside this middleware, so the matched route is not known
/// yet. Unknown paths would otherwise create one series per URL.
#[must_use]
pub fn metrics_path(path: &str) -> &'static str {
    match path {
        "/start_search" | "/api/search/start" => "run",
        "/api/results" => "results",
        "/api/health" => "health",
        "/api/metrics" => "metrics",
        "/" | RESULTS_PATH => "page",
        p if p.starts_with("/api/") => "api_other",
        _ => "asset",
    }
}

const fn status_outcome(status: u16) -> &'static str {
    match status {
        500.. => "error",
        400..=499 => "client_error",
        _ => "success",
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let label = metrics_path(&path);

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status().as_u16();
        let elapsed = start.elapsed();

        let labels = [
            ("method", method.to_string()),
            ("path", label.to_string()),
            ("status", status.to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match response.extensions().get::<RunContext>() {
            Some(run) => info!(
                event = "http_request_finished",
                duration_ms,
                status_code = status,
                outcome = status_outcome(status),
                run_range = %run.range,
                run_outcome = run.outcome,
                "Search run request finished"
            ),
            None => info!(
                event = "http_request_finished",
                duration_ms,
                status_code = status,
                outcome = status_outcome(status),
                "Request finished"
            ),
        }

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("referrer-policy", HeaderValue::from_static("same-origin"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; frame-ancestors 'none'",
        ),
    );

    response
}
