//! # Custom Resource Definitions
//!
//! cert-manager CRD types observed and created by the verifier.
//!
//! Only the fields the verifier reads or writes are modelled. Issuer backends
//! other than `selfSigned` and `ca` are carried as opaque JSON so that any
//! Issuer manifest round-trips unchanged.

mod status;

pub use status::*;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// cert-manager Issuer
///
/// # Example
///
/// ```yaml
/// apiVersion: cert-manager.io/v1
/// kind: Issuer
/// metadata:
///   name: selfsigned
///   namespace: e2e
/// spec:
///   selfSigned: {}
/// ```
#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "Issuer",
    group = "cert-manager.io",
    version = "v1",
    namespaced,
    status = "IssuerStatus",
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSpec {
    /// Self-signed issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_signed: Option<SelfSignedIssuer>,
    /// CA issuer backed by a key pair stored in a Secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<CaIssuer>,
    /// ACME issuer configuration (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acme: Option<serde_json::Value>,
    /// Vault issuer configuration (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<serde_json::Value>,
    /// Venafi TPP / Cloud issuer configuration (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venafi: Option<serde_json::Value>,
}

/// Self-signed issuer configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelfSignedIssuer {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crl_distribution_points: Vec<String>,
}

/// CA issuer configuration
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaIssuer {
    /// Secret holding `tls.crt` and `tls.key` of the signing CA
    pub secret_name: String,
}

/// cert-manager CertificateRequest
///
/// `spec.request` holds the PEM-encoded CSR, base64-encoded as Kubernetes
/// does for `[]byte` fields.
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "CertificateRequest",
    group = "cert-manager.io",
    version = "v1",
    namespaced,
    status = "CertificateRequestStatus",
    shortname = "cr",
    printcolumn = r#"{"name":"Approved", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Approved\")].status"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestSpec {
    /// Base64-encoded PEM CSR
    pub request: String,
    /// Issuer that should sign the request
    pub issuer_ref: ObjectReference,
    /// Requested certificate lifetime (Go duration string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ca: Option<bool>,
    /// Requested key usages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usages: Vec<String>,
}

/// Reference to an issuer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub name: String,
    /// `Issuer` or `ClusterIssuer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ObjectReference {
    /// Reference to a namespaced cert-manager Issuer
    pub fn issuer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some("Issuer".to_string()),
            group: Some(crate::constants::CERT_MANAGER_GROUP.to_string()),
        }
    }
}
