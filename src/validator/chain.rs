//! # Chain
//!
//! Path building from an issued certificate to a caller-supplied trust
//! bundle.
//!
//! Candidates come from extra CERTIFICATE blocks in the payload and from the
//! payload's CA bundle. Nothing in the payload is trusted on its own: a path
//! is valid only when it terminates at a certificate from the trust bundle.
//! Every certificate on the path must be within its validity window,
//! intermediates must be CAs and each link's signature must verify.

use super::error::{PkiError, Result};
use super::pem::{der_blocks, parse_certificates, read_pem_file, CERTIFICATE_TAG};
use crate::constants::MAX_CHAIN_DEPTH;
use std::path::Path;
use x509_parser::prelude::*;

/// Trust anchors the issued chain must terminate at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustBundle {
    certificates: Vec<Vec<u8>>,
}

impl TrustBundle {
    /// Load every CERTIFICATE block of a PEM bundle
    pub fn from_pem(pem_data: &[u8]) -> Result<Self> {
        let certificates = der_blocks(pem_data, CERTIFICATE_TAG)?;
        if certificates.is_empty() {
            return Err(PkiError::MissingBlock(CERTIFICATE_TAG));
        }
        Self::from_der(certificates)
    }

    pub fn from_pem_file(path: &Path) -> Result<Self> {
        Self::from_pem(&read_pem_file(path)?)
    }

    pub fn from_der(certificates: Vec<Vec<u8>>) -> Result<Self> {
        parse_certificates(&certificates)?;
        Ok(Self { certificates })
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub(crate) fn ders(&self) -> &[Vec<u8>] {
        &self.certificates
    }
}

fn subject_of(cert: &X509Certificate<'_>) -> String {
    cert.subject().to_string()
}

fn check_validity(cert: &X509Certificate<'_>, role: &str, now: ASN1Time) -> std::result::Result<(), String> {
    let validity = cert.validity();
    if now < validity.not_before {
        return Err(format!(
            "{role} certificate {} is not yet valid (notBefore {})",
            subject_of(cert),
            validity.not_before
        ));
    }
    if now > validity.not_after {
        return Err(format!(
            "{role} certificate {} has expired (notAfter {})",
            subject_of(cert),
            validity.not_after
        ));
    }
    Ok(())
}

fn issued_by(cert: &X509Certificate<'_>, issuer: &X509Certificate<'_>) -> bool {
    cert.issuer().as_raw() == issuer.subject().as_raw()
        && cert.verify_signature(Some(issuer.public_key())).is_ok()
}

struct PathBuilder<'c, 'a> {
    intermediates: &'c [X509Certificate<'a>],
    anchors: &'c [X509Certificate<'a>],
    used: Vec<bool>,
    now: ASN1Time,
}

impl PathBuilder<'_, '_> {
    fn extend(&mut self, cert: &X509Certificate<'_>, depth: usize) -> std::result::Result<(), String> {
        let mut last_error = None;

        for anchor in self.anchors {
            if issued_by(cert, anchor) {
                match check_validity(anchor, "trust anchor", self.now) {
                    Ok(()) => return Ok(()),
                    Err(e) => last_error = Some(e),
                }
            }
        }

        if depth >= MAX_CHAIN_DEPTH {
            return Err(last_error.unwrap_or_else(|| {
                format!("no trusted path within {MAX_CHAIN_DEPTH} certificates")
            }));
        }

        let intermediates = self.intermediates;
        for (index, candidate) in intermediates.iter().enumerate() {
            if self.used[index] || !issued_by(cert, candidate) {
                continue;
            }
            if !candidate.is_ca() {
                last_error = Some(format!(
                    "certificate {} signs {} but is not a CA",
                    subject_of(candidate),
                    subject_of(cert)
                ));
                continue;
            }
            if let Err(e) = check_validity(candidate, "intermediate", self.now) {
                last_error = Some(e);
                continue;
            }

            self.used[index] = true;
            match self.extend(candidate, depth + 1) {
                Ok(()) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
            self.used[index] = false;
        }

        Err(last_error.unwrap_or_else(|| {
            format!(
                "no trusted issuer found for {} (issuer {})",
                subject_of(cert),
                cert.issuer()
            )
        }))
    }
}

/// Verify that `leaf` chains to one of `anchors`, optionally through
/// `intermediates`, at time `now`
pub(crate) fn verify_chain<'a>(
    leaf: &X509Certificate<'_>,
    intermediates: &[X509Certificate<'a>],
    anchors: &[X509Certificate<'a>],
    now: ASN1Time,
) -> std::result::Result<(), String> {
    check_validity(leaf, "issued", now)?;
    let mut builder = PathBuilder {
        intermediates,
        anchors,
        used: vec![false; intermediates.len()],
        now,
    };
    builder.extend(leaf, 1)
}
