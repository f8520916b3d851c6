//! # Configuration
//!
//! Wait settings loaded from environment variables.
//!
//! All configuration has sensible defaults and can be overridden via environment variables.
//! Command-line flags take precedence over both.

mod duration;
mod wait;

pub use duration::parse_kubernetes_duration;
pub use wait::WaitConfig;

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
