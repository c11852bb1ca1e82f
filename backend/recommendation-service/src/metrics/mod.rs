//! Prometheus metrics for recommendation-service.
//!
//! Exposes per-pipeline collectors and an HTTP handler for the `/metrics` endpoint.

use crate::models::Pipeline;
use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Duration;

static PIPELINE_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "recommendation_requests_total",
        "Total recommendation pipeline runs (success/error)",
        &["pipeline", "status"]
    )
    .expect("Failed to register recommendation requests metric")
});

static PIPELINE_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "recommendation_pipeline_duration_seconds",
        "Duration of a recommendation pipeline including candidate recall",
        &["pipeline"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register recommendation duration metric")
});

static CANDIDATE_POOL_SIZE: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "recommendation_candidate_pool_size",
        "Number of candidates recalled before ranking",
        &["pipeline"],
        vec![0.0, 1.0, 10.0, 25.0, 50.0, 100.0, 200.0]
    )
    .expect("Failed to register candidate pool size metric")
});

/// Record a pipeline run outcome (success/error)
pub fn record_pipeline_result(pipeline: Pipeline, status: &str) {
    PIPELINE_RUNS_TOTAL
        .with_label_values(&[pipeline.as_str(), status])
        .inc();
}

pub fn record_pipeline_duration(pipeline: Pipeline, duration: Duration) {
    PIPELINE_DURATION_SECONDS
        .with_label_values(&[pipeline.as_str()])
        .observe(duration.as_secs_f64());
}

pub fn record_pool_size(pipeline: Pipeline, size: usize) {
    CANDIDATE_POOL_SIZE
        .with_label_values(&[pipeline.as_str()])
        .observe(size as f64);
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
