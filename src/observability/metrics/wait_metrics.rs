//! # Wait Metrics
//!
//! Metrics for condition waits: outcomes, polls, read errors and durations.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec};
use std::sync::LazyLock;

static WAITS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new("issuance_waits_total", "Total number of completed waits"),
        &["outcome"],
    )
    .expect("Failed to create WAITS_TOTAL metric - this should never happen")
});

static WAIT_POLLS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "issuance_wait_polls_total",
        "Total number of status reads performed by waits",
    )
    .expect("Failed to create WAIT_POLLS_TOTAL metric - this should never happen")
});

static WAIT_READ_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "issuance_wait_read_errors_total",
            "Total number of failed status reads, by error class",
        ),
        &["class"],
    )
    .expect("Failed to create WAIT_READ_ERRORS_TOTAL metric - this should never happen")
});

static WAIT_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "issuance_wait_duration_seconds",
            "Duration of waits in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
    )
    .expect("Failed to create WAIT_DURATION metric - this should never happen")
});

/// Register wait metrics with the registry
pub(crate) fn register_wait_metrics() -> Result<()> {
    REGISTRY.register(Box::new(WAITS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WAIT_POLLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WAIT_READ_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WAIT_DURATION.clone()))?;
    Ok(())
}

pub fn increment_waits_total(outcome: &str) {
    WAITS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn increment_wait_polls() {
    WAIT_POLLS_TOTAL.inc();
}

pub fn increment_wait_read_errors(class: &str) {
    WAIT_READ_ERRORS_TOTAL.with_label_values(&[class]).inc();
}

pub fn observe_wait_duration(duration: f64) {
    WAIT_DURATION.observe(duration);
}
