//! Shared fixtures for integration tests.
//!
//! - `TimelineStore`: an in-process resource store whose answers are scripted
//!   against the (paused) tokio clock
//! - `TestCa`: rcgen-backed CA minting leaves, intermediates and CSRs

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use cert_issuance_verifier::waiter::{ConditionStatus, ObservedCondition, ObservedStatus};
use cert_issuance_verifier::{
    AccessError, AccessErrorKind, IssuancePayload, NewResource, PrivateKey, ResourceRef,
    ResourceStore, StatusReader,
};
use rcgen::{
    BasicConstraints, CertificateParams, DnType, IsCa, Issuer, KeyPair, KeyUsagePurpose,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// What a read returns from a point in time onwards
#[derive(Debug, Clone)]
pub enum Step {
    NotFound,
    Conditions(Vec<(&'static str, ConditionStatus, Option<&'static str>)>),
    Error(AccessErrorKind),
    /// The read never completes
    Hang,
}

/// Scripted store: the step with the latest start time not after "now" answers
#[derive(Debug)]
pub struct TimelineStore {
    started: Instant,
    timeline: Vec<(Duration, Step)>,
    reads: Mutex<Vec<Duration>>,
    payload: Option<IssuancePayload>,
    created: Mutex<Vec<ResourceRef>>,
    deleted: Mutex<Vec<ResourceRef>>,
    fetches: AtomicUsize,
}

impl TimelineStore {
    /// Empty timeline; reads return not-found until a step is added
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            timeline: Vec::new(),
            reads: Mutex::new(Vec::new()),
            payload: None,
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn at(mut self, offset: Duration, step: Step) -> Self {
        self.timeline.push((offset, step));
        self.timeline.sort_by_key(|(at, _)| *at);
        self
    }

    pub fn with_payload(mut self, payload: IssuancePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Offsets from construction at which reads happened
    pub fn read_times(&self) -> Vec<Duration> {
        self.reads.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    pub fn created(&self) -> Vec<ResourceRef> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<ResourceRef> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn current_step(&self, elapsed: Duration) -> Step {
        self.timeline
            .iter()
            .rev()
            .find(|(at, _)| *at <= elapsed)
            .map(|(_, step)| step.clone())
            .unwrap_or(Step::NotFound)
    }
}

pub fn status(conditions: &[(&str, ConditionStatus, Option<&str>)]) -> ObservedStatus {
    ObservedStatus::new(
        conditions
            .iter()
            .map(|(t, s, r)| ObservedCondition {
                condition_type: (*t).to_string(),
                status: *s,
                reason: r.map(str::to_string),
                message: None,
                observed_at_revision: None,
            })
            .collect(),
    )
}

#[async_trait]
impl StatusReader for TimelineStore {
    async fn read_status(&self, _resource: &ResourceRef) -> Result<Option<ObservedStatus>, AccessError> {
        let elapsed = self.started.elapsed();
        self.reads.lock().unwrap().push(elapsed);
        match self.current_step(elapsed) {
            Step::NotFound => Ok(None),
            Step::Conditions(conditions) => Ok(Some(status(&conditions))),
            Step::Error(kind) => Err(AccessError::new(kind, format!("scripted {}", kind.as_str()))),
            Step::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ResourceStore for TimelineStore {
    async fn create_resource(
        &self,
        namespace: &str,
        resource: NewResource,
    ) -> Result<ResourceRef, AccessError> {
        let created = match resource {
            NewResource::Issuer(issuer) => {
                ResourceRef::issuer(namespace, issuer.metadata.name.unwrap_or_default())
            }
            NewResource::CertificateRequest(request) => ResourceRef::certificate_request(
                namespace,
                request.metadata.name.unwrap_or_default(),
            ),
        };
        self.created.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_resource(&self, resource: &ResourceRef) -> Result<(), AccessError> {
        self.deleted.lock().unwrap().push(resource.clone());
        Ok(())
    }

    async fn fetch_issued_artifact(&self, resource: &ResourceRef) -> Result<IssuancePayload, AccessError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.payload.clone().ok_or_else(|| {
            AccessError::new(AccessErrorKind::NotIssued, format!("{resource} has no certificate"))
        })
    }
}

/// Self-signed test CA
pub struct TestCa {
    pub key: KeyPair,
    pub pem: String,
    pub der: Vec<u8>,
}

impl TestCa {
    pub fn new(common_name: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let cert = ca_params(common_name).self_signed(&key).unwrap();
        Self {
            pem: cert.pem(),
            der: cert.der().to_vec(),
            key,
        }
    }

    /// CA certificate signed by this CA
    pub fn intermediate(&self, common_name: &str) -> TestCa {
        let key = KeyPair::generate().unwrap();
        let issuer = Issuer::from_ca_cert_pem(&self.pem, &self.key).unwrap();
        let cert = ca_params(common_name).signed_by(&key, &issuer).unwrap();
        TestCa {
            pem: cert.pem(),
            der: cert.der().to_vec(),
            key,
        }
    }

    /// Leaf for `names` with CN set to the first name
    pub fn issue(&self, subject_key: &KeyPair, names: &[&str]) -> String {
        self.issue_with(subject_key, leaf_params(names))
    }

    pub fn issue_with(&self, subject_key: &KeyPair, params: CertificateParams) -> String {
        let issuer = Issuer::from_ca_cert_pem(&self.pem, &self.key).unwrap();
        params.signed_by(subject_key, &issuer).unwrap().pem()
    }
}

fn ca_params(common_name: &str) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    params.distinguished_name.push(DnType::CommonName, common_name);
    params
}

pub fn leaf_params(names: &[&str]) -> CertificateParams {
    let mut params =
        CertificateParams::new(names.iter().map(|n| (*n).to_string()).collect::<Vec<_>>()).unwrap();
    if let Some(first) = names.first() {
        params.distinguished_name.push(DnType::CommonName, *first);
    }
    params
}

/// Fresh ECDSA P-256 key and its validator-side counterpart
pub fn key_pair() -> (KeyPair, PrivateKey) {
    let key = KeyPair::generate().unwrap();
    let private = PrivateKey::from_key_pair(&key);
    (key, private)
}

pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}
