use crate::api::{ApiError, AppState};
use crate::domain::{Capability, Principal};
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

/// `GET /api/metrics`, Prometheus text format. Admin only.
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.can(Capability::ViewMetrics) {
        return Err(ApiError::forbidden("Metrics are restricted to admins"));
    }

    Ok(state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    ))
}

/// Opens the `request` span, records request metrics and logs one event per
/// finished request. The auth middleware fills `user_id` later.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let matched_path = req
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
        route = matched_path.clone(),
        user_id = tracing::field::Empty,
    );

    async move {
        let mut response = next.run(req).await;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();

        let outcome = match status {
            500.. => "error",
            400..=499 => "client_error",
            _ => "success",
        };

        // Matched route keeps label cardinality bounded
        let metrics_path = matched_path.as_deref().unwrap_or(&uri);

        let labels = [
            ("method", method.clone()),
            ("path", metrics_path.to_string()),
            ("status", status.to_string()),
        ];

        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = duration_ms,
            status_code = status,
            outcome = %outcome,
            "Request finished"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// Headers added to every response. The API serves JSON only, so nothing
/// may be framed or loaded from it.
const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    response
}
