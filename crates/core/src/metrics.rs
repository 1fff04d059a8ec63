//! Prometheus metrics for the replay pipeline.
//!
//! Registered into the server's registry via [`all_metrics`].

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Manager
// =============================================================================

/// Replays that finished processing, by final status.
pub static REPLAYS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "replaylink_replays_processed_total",
            "Replays that finished processing",
        ),
        &["status"],
    )
    .unwrap()
});

/// Replays discovered by the file monitor or the startup scan.
pub static REPLAYS_DISCOVERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "replaylink_replays_discovered_total",
            "Replays discovered on disk",
        ),
        &["source"], // "scan", "watch"
    )
    .unwrap()
});

/// Replays currently waiting in the processing queue.
pub static QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("replaylink_queue_depth", "Replays waiting for processing").unwrap()
});

/// Failures while processing a single replay (the worker carried on).
pub static PROCESSING_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "replaylink_processing_errors_total",
        "Errors raised while processing a replay",
    )
    .unwrap()
});

// =============================================================================
// Upload client
// =============================================================================

/// Duplicate checks that failed and were treated as "not found".
pub static DUPLICATE_CHECK_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "replaylink_duplicate_check_failures_total",
        "Duplicate checks that failed open",
    )
    .unwrap()
});

/// Upload duration in seconds.
pub static UPLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("replaylink_upload_duration_seconds", "Duration of replay uploads")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

// =============================================================================
// Pre-match
// =============================================================================

/// Pre-match submissions by result.
pub static PREMATCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("replaylink_prematch_requests_total", "Pre-match submissions"),
        &["result"], // "opened", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(REPLAYS_PROCESSED.clone()),
        Box::new(REPLAYS_DISCOVERED.clone()),
        Box::new(QUEUE_DEPTH.clone()),
        Box::new(PROCESSING_ERRORS.clone()),
        Box::new(DUPLICATE_CHECK_FAILURES.clone()),
        Box::new(UPLOAD_DURATION.clone()),
        Box::new(PREMATCH_REQUESTS.clone()),
    ]
}
