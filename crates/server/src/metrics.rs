//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the shelfsync server:
//! - HTTP request metrics (latency, counts)
//! - Catalog size by media type (collected dynamically)
//! - Core sync, media server and availability metrics (registered from core)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shelfsync_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("shelfsync_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfsync_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Catalog rows by media type.
pub static CATALOG_ITEMS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("shelfsync_catalog_items", "Catalog rows by media type"),
        &["media_type"],
    )
    .unwrap()
});

/// Catalog rows carrying an external metadata id.
pub static CATALOG_ITEMS_WITH_METADATA: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfsync_catalog_items_with_metadata_id",
        "Catalog rows carrying an external metadata id",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Catalog
    registry.register(Box::new(CATALOG_ITEMS.clone())).unwrap();
    registry
        .register(Box::new(CATALOG_ITEMS_WITH_METADATA.clone()))
        .unwrap();

    // Core metrics (sync, media server, availability)
    for metric in shelfsync_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the catalog gauges reflect the store.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    match state.catalog().stats() {
        Ok(stats) => {
            CATALOG_ITEMS
                .with_label_values(&["movie"])
                .set(stats.movies as i64);
            CATALOG_ITEMS
                .with_label_values(&["tv"])
                .set(stats.series as i64);
            CATALOG_ITEMS_WITH_METADATA.set(stats.with_metadata_id as i64);
        }
        Err(e) => warn!("Failed to collect catalog metrics: {}", e),
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
///
/// Only the segment after `/catalog/` carries an item id; `stats` is a route.
pub fn normalize_path(path: &str) -> String {
    static ITEM_ID: Lazy<regex_lite::Regex> =
        Lazy::new(|| regex_lite::Regex::new(r"^(/api/v1/catalog/)([^/]+)$").unwrap());

    match ITEM_ID.captures(path) {
        Some(caps) if &caps[2] != "stats" => format!("{}{{id}}", &caps[1]),
        _ => path.to_string(),
    }
}
