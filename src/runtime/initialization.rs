//! # Initialization
//!
//! rustls setup, tracing, metrics registration and Kubernetes client creation.

use crate::observability;
use crate::resource::KubeResourceStore;
use anyhow::{Context, Result};
use kube::Client;
use tracing::{debug, info};

/// Default `RUST_LOG` filter when none is set
pub const DEFAULT_LOG_FILTER: &str = "cert_issuance_verifier=info,civctl=info";

/// Install the ring crypto provider for rustls
///
/// Must run before the Kubernetes client opens a connection. Installing twice
/// is harmless; the first provider wins.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Initialize the tracing subscriber from `RUST_LOG`
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
    {
        // Already installed by a test harness or an embedding binary
        debug!("Tracing subscriber init returned error (may already be initialized): {e}");
    }
}

/// Initialize logging, metrics and the crypto provider
pub fn initialize() -> Result<()> {
    install_crypto_provider();
    init_tracing();
    observability::metrics::register_metrics().context("Failed to register metrics")?;
    info!("cert-issuance-verifier v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Create the cluster-backed resource store from the ambient kubeconfig
pub async fn connect() -> Result<KubeResourceStore> {
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;
    Ok(KubeResourceStore::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_does_not_panic() {
        install_crypto_provider();
        install_crypto_provider();
        init_tracing();
        init_tracing();
    }
}
