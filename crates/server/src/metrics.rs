//! Prometheus metrics for the Chartroom server.
//!
//! Counters cover artifact writes, conflicts, compensating rollbacks, deletes
//! and index builds. Labels never carry tenant names or filenames.
//!
//! The `/metrics` endpoint is unauthenticated; restrict it at the network
//! level in deployments.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static ARTIFACTS_SAVED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "chartroom_artifacts_saved_total",
            "Total artifacts written to storage by kind",
        ),
        &["kind"],
    )
    .expect("metric creation failed")
});

pub static UPLOAD_CONFLICTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "chartroom_upload_conflicts_total",
        "Total uploads rejected because the artifact already exists",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_ROLLBACKS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "chartroom_upload_rollbacks_total",
        "Total multi-artifact uploads rolled back after a write failure",
    )
    .expect("metric creation failed")
});

pub static ROLLBACK_DELETE_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "chartroom_rollback_delete_failures_total",
        "Total compensating deletes that failed during rollback",
    )
    .expect("metric creation failed")
});

pub static ARTIFACTS_DELETED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "chartroom_artifacts_deleted_total",
            "Total artifacts deleted by kind",
        ),
        &["kind"],
    )
    .expect("metric creation failed")
});

pub static INDEX_BUILDS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "chartroom_index_builds_total",
        "Total tenant index builds",
    )
    .expect("metric creation failed")
});

pub static INDEX_BUILD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "chartroom_index_build_duration_seconds",
            "Time taken to build a tenant index from storage",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry. Safe to call repeatedly.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(ARTIFACTS_SAVED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_CONFLICTS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_ROLLBACKS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ROLLBACK_DELETE_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ARTIFACTS_DELETED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(INDEX_BUILDS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(INDEX_BUILD_DURATION.clone()))
            .expect("metric registration failed");
    });
}

/// Handler for `/metrics`.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Count an artifact write.
pub fn record_saved(kind: chartroom_core::ArtifactKind) {
    ARTIFACTS_SAVED.with_label_values(&[kind.as_str()]).inc();
}

/// Count an artifact delete.
pub fn record_deleted(kind: chartroom_core::ArtifactKind) {
    ARTIFACTS_DELETED.with_label_values(&[kind.as_str()]).inc();
}
