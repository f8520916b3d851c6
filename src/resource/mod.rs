//! # Resource Access
//!
//! Identities of the externally-owned resources and the accessor traits the
//! waiter and the issuance helpers read them through.
//!
//! The resource store and its controllers are never driven from here: the
//! traits only expose point-in-time reads, creation and artifact retrieval.

mod error;
mod kube_store;

pub use kube_store::KubeResourceStore;
pub use error::{AccessError, AccessErrorKind};

use crate::crd::{CertificateRequest, Issuer};
use crate::waiter::ObservedStatus;
use async_trait::async_trait;
use std::fmt;

/// Kinds of resources the accessors understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Issuer,
    CertificateRequest,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Issuer => "Issuer",
            ResourceKind::CertificateRequest => "CertificateRequest",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one externally-owned resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    namespace: String,
    name: String,
    kind: ResourceKind,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn issuer(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Issuer, namespace, name)
    }

    pub fn certificate_request(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ResourceKind::CertificateRequest, namespace, name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// A resource to be created by the orchestration layer
#[derive(Debug, Clone)]
pub enum NewResource {
    Issuer(Issuer),
    CertificateRequest(CertificateRequest),
}

/// Final certificate bytes of an issued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuancePayload {
    /// PEM leaf certificate, optionally followed by intermediates
    pub certificate_pem: Vec<u8>,
    /// PEM CA bundle reported by the issuer
    pub ca_bundle_pem: Option<Vec<u8>>,
}

impl IssuancePayload {
    pub fn new(certificate_pem: impl Into<Vec<u8>>) -> Self {
        Self {
            certificate_pem: certificate_pem.into(),
            ca_bundle_pem: None,
        }
    }

    pub fn with_ca_bundle(mut self, ca_bundle_pem: impl Into<Vec<u8>>) -> Self {
        self.ca_bundle_pem = Some(ca_bundle_pem.into());
        self
    }
}

/// Point-in-time status reads
///
/// `Ok(None)` means the resource does not exist (yet). Implementations must
/// be safe to call concurrently from several waiters.
#[async_trait]
pub trait StatusReader: Send + Sync {
    async fn read_status(&self, resource: &ResourceRef) -> Result<Option<ObservedStatus>, AccessError>;
}

/// Full accessor used by the issuance flow
#[async_trait]
pub trait ResourceStore: StatusReader {
    /// Create a resource in `namespace`, returning its identity
    async fn create_resource(
        &self,
        namespace: &str,
        resource: NewResource,
    ) -> Result<ResourceRef, AccessError>;

    /// Delete a resource; deleting an absent resource succeeds
    async fn delete_resource(&self, resource: &ResourceRef) -> Result<(), AccessError>;

    /// Read the issued certificate of a CertificateRequest
    async fn fetch_issued_artifact(&self, resource: &ResourceRef) -> Result<IssuancePayload, AccessError>;
}
