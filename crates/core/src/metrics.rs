//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync invocations (pages, upserted and excluded items)
//! - Media server calls (handshakes, request latency)
//! - Availability lookups

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Page sync invocations by result.
pub static SYNC_PAGES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("shelfsync_sync_pages_total", "Total page sync invocations"),
        &["result"], // "continued", "done", "failed"
    )
    .unwrap()
});

/// Failed sync invocations by stage.
pub static SYNC_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shelfsync_sync_failures_total",
            "Sync invocations that failed, by stage",
        ),
        &["stage"], // "settings", "auth", "fetch", "upsert"
    )
    .unwrap()
});

/// Items written to the catalog.
pub static ITEMS_UPSERTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shelfsync_sync_items_upserted_total",
        "Total items written to the catalog",
    )
    .unwrap()
});

/// Items dropped by the title deny-list.
pub static ITEMS_EXCLUDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shelfsync_sync_items_excluded_total",
        "Total items dropped by the title deny-list",
    )
    .unwrap()
});

/// Items skipped for lacking an id or title.
pub static ITEMS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shelfsync_sync_items_skipped_total",
        "Total items skipped because they lacked an id or title",
    )
    .unwrap()
});

// =============================================================================
// Media Server Metrics
// =============================================================================

/// Handshake attempts by strategy and result.
pub static AUTH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shelfsync_media_server_auth_total",
            "Media server handshake attempts",
        ),
        &["strategy", "result"], // "keyed_session"/"direct_token", "success"/"failure"
    )
    .unwrap()
});

/// Media server request duration in seconds.
pub static MEDIA_SERVER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shelfsync_media_server_request_duration_seconds",
            "Duration of media server requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation", "status"],
    )
    .unwrap()
});

// =============================================================================
// Availability Metrics
// =============================================================================

/// Availability lookups by result.
pub static AVAILABILITY_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shelfsync_availability_lookups_total",
            "Availability lookups against the catalog",
        ),
        &["result"], // "success", "degraded"
    )
    .unwrap()
});

/// All core metrics, for registration by the hosting binary.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Sync
        Box::new(SYNC_PAGES.clone()),
        Box::new(SYNC_FAILURES.clone()),
        Box::new(ITEMS_UPSERTED.clone()),
        Box::new(ITEMS_EXCLUDED.clone()),
        Box::new(ITEMS_SKIPPED.clone()),
        // Media server
        Box::new(AUTH_ATTEMPTS.clone()),
        Box::new(MEDIA_SERVER_REQUEST_DURATION.clone()),
        // Availability
        Box::new(AVAILABILITY_LOOKUPS.clone()),
    ]
}
