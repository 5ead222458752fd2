//! Metrics collection and exposition.
//!
//! # Metrics
//! - `auth_requests_total` (counter): requests by endpoint, status
//! - `auth_request_duration_seconds` (histogram): latency by endpoint
//!
//! Recording is always on; without an installed exporter the `metrics`
//! macros are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "auth_requests_total",
        "endpoint" => endpoint.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "auth_request_duration_seconds",
        "endpoint" => endpoint.to_owned()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Route middleware recording one sample per request.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    record_request(&endpoint, response.status().as_u16(), start);
    response
}
