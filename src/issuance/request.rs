//! Key, CSR and CertificateRequest generation.

use crate::crd::{CertificateRequest, CertificateRequestSpec, ObjectReference};
use crate::validator::{PkiError, PrivateKey, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rcgen::{CertificateParams, DnType, KeyPair, SignatureAlgorithm};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Key algorithms available for generated requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyAlgorithm {
    #[default]
    EcdsaP256,
    EcdsaP384,
    Ed25519,
    Rsa2048,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::EcdsaP256 => "ecdsa-p256",
            KeyAlgorithm::EcdsaP384 => "ecdsa-p384",
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::Rsa2048 => "rsa-2048",
        }
    }

    fn signature_algorithm(self) -> &'static SignatureAlgorithm {
        match self {
            KeyAlgorithm::EcdsaP256 => &rcgen::PKCS_ECDSA_P256_SHA256,
            KeyAlgorithm::EcdsaP384 => &rcgen::PKCS_ECDSA_P384_SHA384,
            KeyAlgorithm::Ed25519 => &rcgen::PKCS_ED25519,
            // 2048-bit modulus
            KeyAlgorithm::Rsa2048 => &rcgen::PKCS_RSA_SHA256,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecdsa-p256" | "p256" | "ecdsa" => Ok(KeyAlgorithm::EcdsaP256),
            "ecdsa-p384" | "p384" => Ok(KeyAlgorithm::EcdsaP384),
            "ed25519" => Ok(KeyAlgorithm::Ed25519),
            "rsa-2048" | "rsa2048" | "rsa" => Ok(KeyAlgorithm::Rsa2048),
            other => Err(format!(
                "unsupported key algorithm '{other}' (expected ecdsa-p256, ecdsa-p384, ed25519 or rsa-2048)"
            )),
        }
    }
}

/// A freshly generated signing request and its private key
#[derive(Debug, Clone)]
pub struct GeneratedRequest {
    pub csr_pem: String,
    pub key: PrivateKey,
}

/// Generate a key pair and a CSR for `dns_names`
///
/// The subject common name is set when `common_name` is given.
pub fn generate_csr(
    common_name: Option<&str>,
    dns_names: &[String],
    algorithm: KeyAlgorithm,
) -> Result<GeneratedRequest> {
    let key_pair = KeyPair::generate_for(algorithm.signature_algorithm())
        .map_err(|e| PkiError::KeyGenerationFailed(format!("{algorithm}: {e}")))?;

    let mut params = CertificateParams::new(dns_names.to_vec())
        .map_err(|e| PkiError::InvalidCsr(format!("invalid DNS names: {e}")))?;
    if let Some(cn) = common_name {
        params.distinguished_name.push(DnType::CommonName, cn);
    }

    let csr = params
        .serialize_request(&key_pair)
        .map_err(|e| PkiError::InvalidCsr(format!("failed to sign CSR: {e}")))?;
    let csr_pem = csr
        .pem()
        .map_err(|e| PkiError::InvalidCsr(format!("failed to encode CSR: {e}")))?;

    Ok(GeneratedRequest {
        csr_pem,
        key: PrivateKey::from_key_pair(&key_pair),
    })
}

/// CertificateRequest for `csr_pem` signed by `issuer_ref`
pub fn build_certificate_request(
    name: &str,
    namespace: &str,
    issuer_ref: ObjectReference,
    csr_pem: &str,
) -> CertificateRequest {
    let mut request = CertificateRequest::new(
        name,
        CertificateRequestSpec {
            request: STANDARD.encode(csr_pem),
            issuer_ref,
            duration: None,
            is_ca: None,
            usages: Vec::new(),
        },
    );
    request.metadata.namespace = Some(namespace.to_string());
    request
}

/// Ten lowercase hex characters, valid as a DNS label and a resource name suffix
pub fn random_label() -> String {
    Uuid::new_v4().simple().to_string().chars().take(10).collect()
}

/// Random single-label name under `domain`, e.g. `3f9a0c2b7e.issuance-e2e.example`
pub fn random_dns_name(domain: &str) -> String {
    format!("{}.{domain}", random_label())
}
