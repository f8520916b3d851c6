//! # Runtime Module
//!
//! Process-level setup shared by the `civctl` commands: rustls provider,
//! tracing subscriber, metrics registry and Kubernetes client.

pub mod initialization;

pub use initialization::*;
