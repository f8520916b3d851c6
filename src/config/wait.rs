//! # Wait Configuration
//!
//! Timeouts and poll intervals loaded from environment variables.

use super::env_var_or_default;
use crate::constants::{
    DEFAULT_ISSUER_READY_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_SECS,
};
use std::time::Duration;

/// Wait configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Hard deadline for a CertificateRequest wait
    pub timeout: Duration,
    /// Interval between two status reads
    pub poll_interval: Duration,
    /// Hard deadline for an Issuer to become Ready
    pub issuer_ready_timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            issuer_ready_timeout: Duration::from_secs(DEFAULT_ISSUER_READY_TIMEOUT_SECS),
        }
    }
}

impl WaitConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            timeout: Duration::from_secs(env_var_or_default(
                "WAIT_TIMEOUT_SECS",
                DEFAULT_WAIT_TIMEOUT_SECS,
            )),
            poll_interval: Duration::from_millis(env_var_or_default(
                "WAIT_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )),
            issuer_ready_timeout: Duration::from_secs(env_var_or_default(
                "ISSUER_READY_TIMEOUT_SECS",
                DEFAULT_ISSUER_READY_TIMEOUT_SECS,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_interval_is_a_tenth_of_timeout() {
        let config = WaitConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.poll_interval * 10 <= config.timeout);
    }

    #[test]
    fn test_unparseable_env_value_falls_back_to_default() {
        assert_eq!(
            env_var_or_default("CIV_TEST_SURELY_UNSET_VARIABLE", 42u64),
            42
        );
    }
}
