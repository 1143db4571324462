use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

use crate::playlist::AssemblyReport;

/// Metric name prefix for all Mixtape metrics
const PREFIX: &str = "mixtape";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Track resolution
    pub static ref SONGS_RESOLVED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_songs_resolved_total"), "Tracks added to playlists by resolution stage"),
        &["stage"]
    ).expect("Failed to create songs_resolved_total metric");

    pub static ref SONGS_NOT_FOUND_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_songs_not_found_total"),
        "Suggested songs that matched no catalog track"
    ).expect("Failed to create songs_not_found_total metric");

    pub static ref CATALOG_SEARCHES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_catalog_searches_total"), "Catalog search calls by outcome"),
        &["outcome"]
    ).expect("Failed to create catalog_searches_total metric");

    // Planning
    pub static ref PLANNER_FALLBACKS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_planner_fallbacks_total"), "Placeholder plans used instead of the planner output"),
        &["reason"]
    ).expect("Failed to create planner_fallbacks_total metric");

    pub static ref PLAYLISTS_GENERATED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_playlists_generated_total"), "Playlist generation requests by outcome"),
        &["outcome"]
    ).expect("Failed to create playlists_generated_total metric");
}

/// Registers every metric with [`REGISTRY`]. Safe to call more than once.
pub fn init_metrics() {
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(SONGS_RESOLVED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SONGS_NOT_FOUND_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_SEARCHES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PLANNER_FALLBACKS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PLAYLISTS_GENERATED_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Adds the resolution counts of one assembly, successful or not.
pub fn record_assembly(report: &AssemblyReport) {
    for (stage, count) in [
        ("exact", report.exact_count),
        ("similar", report.similar_count),
        ("supplement", report.supplemented_count),
    ] {
        SONGS_RESOLVED_TOTAL
            .with_label_values(&[stage])
            .inc_by(count as f64);
    }
    SONGS_NOT_FOUND_TOTAL.inc_by(report.not_found_count as f64);
}

pub fn record_catalog_search(outcome: &str) {
    CATALOG_SEARCHES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_planner_fallback(reason: &str) {
    PLANNER_FALLBACKS_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_playlist_generated(outcome: &str) {
    PLAYLISTS_GENERATED_TOTAL.with_label_values(&[outcome]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
