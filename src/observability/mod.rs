//! # Observability
//!
//! Prometheus metrics for waits and validations.

pub mod metrics;
