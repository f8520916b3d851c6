//! # Metrics Module
//!
//! Prometheus metrics, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text exposition
//! - `wait_metrics` - Condition waiter metrics (outcomes, polls, read errors, durations)
//! - `validation_metrics` - Issuance validator metrics (validations, defects per check)

pub mod registry;
pub mod validation_metrics;
pub mod wait_metrics;

pub use registry::*;
pub use validation_metrics::*;
pub use wait_metrics::*;
