//! Consistency check between an issued certificate and the CSR it answers.

use super::keys::same_public_key;
use super::names::{request_names, NameComparison};
use super::pem::{der_blocks, CSR_TAG, LEGACY_CSR_TAG};
use x509_parser::prelude::*;

/// Outcome of comparing a certificate with its signing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RequestCheck {
    pub matches: bool,
    pub errors: Vec<String>,
}

impl RequestCheck {
    fn defect(error: String) -> Self {
        Self {
            matches: false,
            errors: vec![error],
        }
    }
}

fn request_der(csr_pem: &[u8]) -> Result<Vec<u8>, String> {
    let mut blocks = der_blocks(csr_pem, CSR_TAG).map_err(|e| e.to_string())?;
    if blocks.is_empty() {
        blocks = der_blocks(csr_pem, LEGACY_CSR_TAG).map_err(|e| e.to_string())?;
    }
    blocks
        .into_iter()
        .next()
        .ok_or_else(|| "signing request contains no CERTIFICATE REQUEST block".to_string())
}

/// The certificate must carry the CSR's public key and exactly its names
pub(crate) fn check_request(csr_pem: &[u8], cert: &X509Certificate<'_>) -> RequestCheck {
    let der = match request_der(csr_pem) {
        Ok(der) => der,
        Err(e) => return RequestCheck::defect(e),
    };
    let csr = match X509CertificationRequest::from_der(&der) {
        Ok((_, csr)) => csr,
        Err(e) => return RequestCheck::defect(format!("failed to parse signing request: {e}")),
    };

    let mut errors = Vec::new();

    if let Err(e) = csr.verify_signature() {
        errors.push(format!("signing request self-signature is invalid: {e}"));
    }

    match same_public_key(&csr.certification_request_info.subject_pki, cert.public_key()) {
        Ok(true) => {}
        Ok(false) => {
            errors.push("certificate public key differs from the signing request key".to_string());
        }
        Err(e) => errors.push(e),
    }

    match (request_names(&csr), super::names::certificate_names(cert)) {
        (Ok(requested), Ok(actual)) => {
            errors.extend(NameComparison::compare(&actual, &requested).errors("certificate (vs signing request)"));
        }
        (Err(e), _) | (_, Err(e)) => errors.push(e),
    }

    RequestCheck {
        matches: errors.is_empty(),
        errors,
    }
}
