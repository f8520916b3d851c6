//! # CIVCTL CLI
//!
//! Command-line interface for the certificate issuance verifier.
//!
//! ## Usage
//!
//! ```bash
//! # Wait for an Issuer to become Ready
//! civctl --namespace e2e wait --kind issuer --name ca-issuer --condition Ready \
//!     --fail-on Ready=False:Failed --timeout 60s
//!
//! # Validate an issued certificate against its key and requested names
//! civctl validate --cert tls.crt --key tls.key --name app.example.com --trust ca.crt
//!
//! # Full flow: create Issuer, request a certificate, wait and validate
//! civctl --namespace e2e run --issuer-manifest issuer.yaml --dns-name app.example.com
//! ```

use anyhow::{Context, Result};
use cert_issuance_verifier::config::{parse_kubernetes_duration, WaitConfig};
use cert_issuance_verifier::crd::{Issuer, ObjectReference};
use cert_issuance_verifier::issuance::{
    build_certificate_request, generate_csr, random_dns_name, random_label, wait_issued_valid,
    wait_issuer_ready, KeyAlgorithm,
};
use cert_issuance_verifier::observability::metrics;
use cert_issuance_verifier::runtime;
use cert_issuance_verifier::{
    ConditionSpec, ConditionWaiter, IssuancePayload, IssuanceValidator, NewResource, PrivateKey,
    ResourceKind, ResourceRef, ResourceStore, TrustBundle, ValidationResult, WaitRequest,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Domain random DNS names are generated under when `run` gets none
const DEFAULT_DNS_DOMAIN: &str = "issuance-e2e.example";

/// Certificate issuance verifier CLI
#[derive(Parser)]
#[command(name = "civctl")]
#[command(about = "Wait on cert-manager conditions and validate issued certificates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes namespace
    #[arg(short, long, global = true, default_value = "default")]
    namespace: String,

    /// Print Prometheus metrics to stderr after the command finishes
    #[arg(long, global = true)]
    print_metrics: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Issuer,
    CertificateRequest,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Issuer => ResourceKind::Issuer,
            KindArg::CertificateRequest => ResourceKind::CertificateRequest,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a condition on an Issuer or CertificateRequest
    Wait {
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Name of the resource
        #[arg(long)]
        name: String,

        /// Condition type to wait for
        #[arg(short, long, default_value = "Ready")]
        condition: String,

        /// Desired condition status
        #[arg(short, long, default_value = "True")]
        status: String,

        /// Abort when this condition is observed (`Type=Status[:Reason]`); repeatable
        #[arg(long = "fail-on")]
        fail_on: Vec<ConditionSpec>,

        /// Hard deadline, e.g. `30s` or `2m` (default: WAIT_TIMEOUT_SECS)
        #[arg(long, value_parser = parse_kubernetes_duration)]
        timeout: Option<Duration>,

        /// Interval between reads, e.g. `500ms` (default: WAIT_POLL_INTERVAL_MS)
        #[arg(long, value_parser = parse_kubernetes_duration)]
        poll_interval: Option<Duration>,
    },
    /// Validate an issued certificate against its private key and names
    Validate {
        /// PEM certificate; extra blocks are treated as intermediates
        #[arg(long)]
        cert: PathBuf,

        /// PEM private key the certificate must pair with
        #[arg(long)]
        key: PathBuf,

        /// Requested DNS name; repeatable
        #[arg(long = "name")]
        names: Vec<String>,

        /// CA bundle reported alongside the certificate
        #[arg(long)]
        ca_bundle: Option<PathBuf>,

        /// Trust anchors the chain must terminate at
        #[arg(long)]
        trust: Option<PathBuf>,

        /// Original CSR to check the certificate against
        #[arg(long)]
        csr: Option<PathBuf>,
    },
    /// Create an Issuer, request a certificate from it and validate the result
    Run {
        /// YAML manifest of the Issuer to create
        #[arg(long)]
        issuer_manifest: PathBuf,

        /// DNS name to request; repeatable (default: one random name)
        #[arg(long = "dns-name")]
        dns_names: Vec<String>,

        /// Key algorithm of the generated request
        #[arg(long, default_value = "ecdsa-p256")]
        key_algorithm: KeyAlgorithm,

        /// Trust anchors the issued chain must terminate at
        #[arg(long)]
        trust: Option<PathBuf>,

        /// Deadline for the CertificateRequest, e.g. `30s`
        #[arg(long, value_parser = parse_kubernetes_duration)]
        timeout: Option<Duration>,

        /// Leave the created resources in the cluster
        #[arg(long)]
        keep: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    runtime::initialize()?;

    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let result = match cli.command {
        Commands::Wait {
            kind,
            name,
            condition,
            status,
            fail_on,
            timeout,
            poll_interval,
        } => {
            let success: ConditionSpec = format!("{condition}={status}")
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let resource = ResourceRef::new(kind.into(), &cli.namespace, name);
            wait_command(resource, success, fail_on, timeout, poll_interval, &cancel).await
        }
        Commands::Validate {
            cert,
            key,
            names,
            ca_bundle,
            trust,
            csr,
        } => validate_command(
            &cert,
            &key,
            &names,
            ca_bundle.as_deref(),
            trust.as_deref(),
            csr.as_deref(),
        ),
        Commands::Run {
            issuer_manifest,
            dns_names,
            key_algorithm,
            trust,
            timeout,
            keep,
        } => {
            let scenario = Scenario {
                namespace: cli.namespace.clone(),
                dns_names,
                key_algorithm,
                trust: trust.as_deref().map(load_trust_bundle).transpose()?,
                keep,
            };
            run_command(&issuer_manifest, scenario, timeout, &cancel).await
        }
    };

    if cli.print_metrics {
        match metrics::gather_text() {
            Ok(text) => eprint!("{text}"),
            Err(e) => warn!("Failed to render metrics: {e}"),
        }
    }

    result
}

/// Cancel in-flight waits on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn load_trust_bundle(path: &Path) -> Result<TrustBundle> {
    TrustBundle::from_pem_file(path)
        .with_context(|| format!("Failed to load trust bundle '{}'", path.display()))
}

fn print_result(result: &ValidationResult) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(result).context("Failed to serialize validation result")?
    );
    Ok(())
}

async fn wait_command(
    resource: ResourceRef,
    success: ConditionSpec,
    fail_on: Vec<ConditionSpec>,
    timeout: Option<Duration>,
    poll_interval: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<()> {
    let store = runtime::connect().await?;
    let config = WaitConfig::from_env();

    let mut request = WaitRequest::with_config(resource.clone(), success, &config);
    for spec in fail_on {
        request = request.fail_on(spec);
    }
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }
    if let Some(poll_interval) = poll_interval {
        request = request.poll_interval(poll_interval);
    }

    println!("Waiting for {} on {resource}...", request.success);
    let outcome = ConditionWaiter::new(&store)
        .wait(&request, cancel)
        .await
        .context("Invalid wait request")?;

    println!("{resource}: {}", outcome.as_str());
    println!("  Last observed: {}", outcome.status().summary());
    if let Some(reason) = outcome.reason() {
        println!("  Reason: {reason}");
    }

    outcome
        .into_result()
        .map(|_| ())
        .with_context(|| format!("Wait on {resource} did not succeed"))
}

fn validate_command(
    cert: &Path,
    key: &Path,
    names: &[String],
    ca_bundle: Option<&Path>,
    trust: Option<&Path>,
    csr: Option<&Path>,
) -> Result<()> {
    let key = PrivateKey::from_pem_file(key)
        .with_context(|| format!("Failed to load private key '{}'", key.display()))?;

    let mut payload = IssuancePayload::new(read_file(cert)?);
    if let Some(path) = ca_bundle {
        payload = payload.with_ca_bundle(read_file(path)?);
    }
    let trust = trust.map(load_trust_bundle).transpose()?;
    let csr = csr.map(read_file).transpose()?;

    let mut validator = IssuanceValidator::new(&key, names);
    if let Some(bundle) = &trust {
        validator = validator.trust_bundle(bundle);
    }
    if let Some(csr) = &csr {
        validator = validator.signing_request(csr);
    }

    let result = validator.validate(&payload);
    print_result(&result)?;
    result.into_result()?;
    Ok(())
}

/// Inputs of one end-to-end issuance run
struct Scenario {
    namespace: String,
    dns_names: Vec<String>,
    key_algorithm: KeyAlgorithm,
    trust: Option<TrustBundle>,
    keep: bool,
}

async fn run_command(
    issuer_manifest: &Path,
    scenario: Scenario,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<()> {
    let manifest = read_file(issuer_manifest)?;
    let issuer: Issuer = serde_yaml::from_slice(&manifest)
        .with_context(|| format!("Failed to parse Issuer manifest '{}'", issuer_manifest.display()))?;

    let store = runtime::connect().await?;
    let mut config = WaitConfig::from_env();
    if let Some(timeout) = timeout {
        config.timeout = timeout;
    }

    info!("Creating Issuer");
    let issuer_ref = store
        .create_resource(&scenario.namespace, NewResource::Issuer(issuer))
        .await
        .context("Failed to create Issuer")?;

    let result = issue_and_validate(&store, &issuer_ref, &scenario, &config, cancel).await;

    if !scenario.keep {
        if let Err(e) = store.delete_resource(&issuer_ref).await {
            warn!("Failed to delete {issuer_ref}: {e}");
        }
    }

    let validation = result?;
    print_result(&validation)?;
    validation.into_result()?;
    Ok(())
}

async fn issue_and_validate<S: ResourceStore>(
    store: &S,
    issuer_ref: &ResourceRef,
    scenario: &Scenario,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<ValidationResult> {
    wait_issuer_ready(store, issuer_ref, config, cancel).await?;

    let dns_names = if scenario.dns_names.is_empty() {
        vec![random_dns_name(DEFAULT_DNS_DOMAIN)]
    } else {
        scenario.dns_names.clone()
    };
    let generated = generate_csr(
        dns_names.first().map(String::as_str),
        &dns_names,
        scenario.key_algorithm,
    )
    .context("Failed to generate certificate signing request")?;

    let request_name = format!("{}-{}", issuer_ref.name(), random_label());
    let request = build_certificate_request(
        &request_name,
        &scenario.namespace,
        ObjectReference::issuer(issuer_ref.name()),
        &generated.csr_pem,
    );

    info!(names = ?dns_names, "Creating CertificateRequest");
    let request_ref = store
        .create_resource(&scenario.namespace, NewResource::CertificateRequest(request))
        .await
        .context("Failed to create CertificateRequest")?;

    let mut validator = IssuanceValidator::new(&generated.key, &dns_names)
        .signing_request(generated.csr_pem.as_bytes());
    if let Some(bundle) = &scenario.trust {
        validator = validator.trust_bundle(bundle);
    }

    let result = wait_issued_valid(store, &request_ref, &validator, config, cancel).await;

    if !scenario.keep {
        if let Err(e) = store.delete_resource(&request_ref).await {
            warn!("Failed to delete {request_ref}: {e}");
        }
    }

    Ok(result?)
}
