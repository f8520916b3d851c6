//! # cert-manager Status
//!
//! Status types for Issuer and CertificateRequest resources.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of an Issuer
#[derive(Debug, Clone, Deserialize, Serialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuerStatus {
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Status of a CertificateRequest
#[derive(Debug, Clone, Deserialize, Serialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestStatus {
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Base64-encoded PEM certificate (leaf first, optionally followed by intermediates)
    #[serde(default)]
    pub certificate: Option<String>,
    /// Base64-encoded PEM CA bundle of the signing issuer
    #[serde(default)]
    pub ca: Option<String>,
    /// Time at which the request failed terminally (RFC3339)
    #[serde(default)]
    pub failure_time: Option<String>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
    /// Generation of the resource the condition was set for
    #[serde(default)]
    pub observed_generation: Option<i64>,
}
