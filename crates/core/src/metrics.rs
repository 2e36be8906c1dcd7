//! Prometheus metrics for batch runs.
//!
//! This module provides metrics for:
//! - Job outcomes (converted, skipped, failed, panicked)
//! - Conversion durations
//! - Ledger persistence failures
//!
//! Batch runs are short-lived, so the binary writes the text exposition to a
//! file for a node_exporter textfile collector instead of serving it.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Registry holding every core metric.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in all_metrics() {
        // Names are unique and constant, registration cannot collide.
        let _ = registry.register(metric);
    }
    registry
});

/// Jobs finished, by outcome.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reencode_jobs_total", "Total jobs finished by the worker pool"),
        &["outcome"], // "converted", "skipped", "failed", "panicked"
    )
    .unwrap()
});

/// Duration of successful conversions in seconds.
pub static CONVERSION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "reencode_conversion_duration_seconds",
            "Duration of successful conversions",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

/// Ledger writes that failed after a successful conversion.
pub static LEDGER_WRITE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reencode_ledger_write_failures_total",
        "Ledger writes that failed after a successful conversion",
    )
    .unwrap()
});

/// Files discovered per batch, before filtering.
pub static FILES_DISCOVERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reencode_files_discovered_total",
        "Files found under the batch root before type filtering",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(LEDGER_WRITE_FAILURES.clone()),
        Box::new(FILES_DISCOVERED.clone()),
    ]
}

/// Encode all metrics in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
