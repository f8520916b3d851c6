//! # Validation Metrics
//!
//! Metrics for issuance validation: calls and defects per check.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec};
use std::sync::LazyLock;

static VALIDATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "issuance_validations_total",
        "Total number of issued certificates validated",
    )
    .expect("Failed to create VALIDATIONS_TOTAL metric - this should never happen")
});

static VALIDATION_DEFECTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "issuance_validation_defects_total",
            "Total number of failed validation checks, by check",
        ),
        &["check"],
    )
    .expect("Failed to create VALIDATION_DEFECTS_TOTAL metric - this should never happen")
});

/// Register validation metrics with the registry
pub(crate) fn register_validation_metrics() -> Result<()> {
    REGISTRY.register(Box::new(VALIDATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VALIDATION_DEFECTS_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_validations_total() {
    VALIDATIONS_TOTAL.inc();
}

pub fn increment_validation_defects(check: &str) {
    VALIDATION_DEFECTS_TOTAL.with_label_values(&[check]).inc();
}
