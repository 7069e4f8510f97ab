//! Prometheus metrics

use std::sync::OnceLock;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder; call once at startup
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    counter!("stories_generated_total").absolute(0);
    counter!("stories_fetched_total").absolute(0);
    counter!("story_generation_failures_total").absolute(0);

    METRICS_HANDLE.get_or_init(|| handle.clone());
    Ok(handle)
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

pub fn record_story_generated() {
    counter!("stories_generated_total").increment(1);
}

pub fn record_story_fetched() {
    counter!("stories_fetched_total").increment(1);
}

pub fn record_generation_failure() {
    counter!("story_generation_failures_total").increment(1);
}

pub fn record_generation_latency(duration_secs: f64) {
    histogram!("story_generation_duration_seconds").record(duration_secs);
}

/// `/metrics` in Prometheus text format
pub async fn metrics_handler() -> impl IntoResponse {
    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}
