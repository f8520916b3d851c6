//! # Issuance Validator
//!
//! Checks an issued certificate payload against the private key and names
//! that were requested, and optionally against a trust bundle and the
//! original signing request.
//!
//! Validation never fails as a whole: every defect found is recorded in the
//! returned [`ValidationResult`]. Only a payload whose leaf cannot be parsed
//! stops the checks early.
//!
//! ```rust,ignore
//! let result = IssuanceValidator::new(&key, ["app.example.com"])
//!     .trust_bundle(&bundle)
//!     .validate(&payload);
//! result.into_result()?;
//! ```

mod chain;
mod csr;
mod error;
mod keys;
mod names;
mod pem;

pub use chain::TrustBundle;
pub use error::{PkiError, Result, ValidationError};
pub use keys::PrivateKey;
pub use names::{normalize_name, normalize_names};
pub use x509_parser::time::ASN1Time;

use crate::observability::metrics;
use crate::resource::IssuancePayload;
use names::{certificate_names, NameComparison};
use pem::{der_blocks, parse_certificates, CERTIFICATE_TAG};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};
use x509_parser::prelude::*;

/// Outcome of validating one issued certificate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub key_matches: bool,
    pub names_match: bool,
    /// Unset when no trust bundle was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_valid: Option<bool>,
    /// Unset when no signing request was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_matches: Option<bool>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Every check that ran passed
    pub fn is_valid(&self) -> bool {
        self.key_matches
            && self.names_match
            && self.chain_valid != Some(false)
            && self.request_matches != Some(false)
            && self.errors.is_empty()
    }

    pub fn into_result(self) -> std::result::Result<Self, ValidationError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }

    fn record_metrics(&self) {
        metrics::increment_validations_total();
        if !self.key_matches {
            metrics::increment_validation_defects("key");
        }
        if !self.names_match {
            metrics::increment_validation_defects("names");
        }
        if self.chain_valid == Some(false) {
            metrics::increment_validation_defects("chain");
        }
        if self.request_matches == Some(false) {
            metrics::increment_validation_defects("request");
        }
    }
}

/// Validator for issued certificates
///
/// Holds borrowed inputs only; one validator can check any number of
/// payloads.
#[derive(Debug)]
pub struct IssuanceValidator<'a> {
    expected_key: &'a PrivateKey,
    requested_names: BTreeSet<String>,
    trust_bundle: Option<&'a TrustBundle>,
    signing_request: Option<&'a [u8]>,
    now: Option<ASN1Time>,
}

impl<'a> IssuanceValidator<'a> {
    pub fn new<I, S>(expected_key: &'a PrivateKey, requested_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            expected_key,
            requested_names: normalize_names(requested_names),
            trust_bundle: None,
            signing_request: None,
            now: None,
        }
    }

    #[must_use]
    pub fn trust_bundle(mut self, bundle: &'a TrustBundle) -> Self {
        self.trust_bundle = Some(bundle);
        self
    }

    /// Also check the certificate against the CSR PEM it was issued for
    #[must_use]
    pub fn signing_request(mut self, csr_pem: &'a [u8]) -> Self {
        self.signing_request = Some(csr_pem);
        self
    }

    /// Evaluate validity windows at `now` instead of the wall clock
    #[must_use]
    pub fn at(mut self, now: ASN1Time) -> Self {
        self.now = Some(now);
        self
    }

    pub fn validate(&self, payload: &IssuancePayload) -> ValidationResult {
        let result = self.run_checks(payload);
        result.record_metrics();
        if result.is_valid() {
            debug!("Issued certificate passed validation");
        } else {
            warn!(
                errors = ?result.errors,
                "Issued certificate failed validation"
            );
        }
        result
    }

    fn unparseable(&self, error: String) -> ValidationResult {
        ValidationResult {
            key_matches: false,
            names_match: false,
            chain_valid: self.trust_bundle.map(|_| false),
            request_matches: self.signing_request.map(|_| false),
            errors: vec![error],
        }
    }

    fn run_checks(&self, payload: &IssuancePayload) -> ValidationResult {
        let ders = match der_blocks(&payload.certificate_pem, CERTIFICATE_TAG) {
            Ok(ders) => ders,
            Err(e) => return self.unparseable(format!("issued certificate: {e}")),
        };
        let Some(leaf_der) = ders.first() else {
            return self.unparseable("issued certificate: no CERTIFICATE block found".to_string());
        };
        let leaf = match X509Certificate::from_der(leaf_der) {
            Ok((_, leaf)) => leaf,
            Err(e) => {
                return self.unparseable(format!("failed to parse issued certificate: {e}"));
            }
        };

        let mut result = ValidationResult::default();

        match self.expected_key.matches(leaf.public_key()) {
            Ok(true) => result.key_matches = true,
            Ok(false) => result
                .errors
                .push("certificate public key does not match the private key".to_string()),
            Err(e) => result.errors.push(e),
        }

        match certificate_names(&leaf) {
            Ok(actual) => {
                let comparison = NameComparison::compare(&actual, &self.requested_names);
                result.names_match = comparison.is_match();
                result.errors.extend(comparison.errors("certificate"));
            }
            Err(e) => result.errors.push(e),
        }

        if let Some(bundle) = self.trust_bundle {
            let chain = self.check_chain(&leaf, &ders[1..], payload.ca_bundle_pem.as_deref(), bundle);
            result.chain_valid = Some(chain.is_ok());
            if let Err(e) = chain {
                result.errors.push(format!("chain validation failed: {e}"));
            }
        }

        if let Some(csr_pem) = self.signing_request {
            let check = csr::check_request(csr_pem, &leaf);
            result.request_matches = Some(check.matches);
            result.errors.extend(check.errors);
        }

        result
    }

    fn check_chain(
        &self,
        leaf: &X509Certificate<'_>,
        extra_blocks: &[Vec<u8>],
        ca_bundle_pem: Option<&[u8]>,
        bundle: &TrustBundle,
    ) -> std::result::Result<(), String> {
        let mut intermediate_ders = extra_blocks.to_vec();
        if let Some(ca_pem) = ca_bundle_pem {
            let ca_ders = der_blocks(ca_pem, CERTIFICATE_TAG)
                .map_err(|e| format!("CA bundle: {e}"))?;
            intermediate_ders.extend(ca_ders);
        }
        let intermediates = parse_certificates(&intermediate_ders)
            .map_err(|e| format!("intermediate {e}"))?;
        let anchors = parse_certificates(bundle.ders()).map_err(|e| e.to_string())?;
        chain::verify_chain(
            leaf,
            &intermediates,
            &anchors,
            self.now.unwrap_or_else(ASN1Time::now),
        )
    }
}

/// Validate `payload` at the current time
pub fn validate(
    payload: &IssuancePayload,
    expected_key: &PrivateKey,
    requested_names: &[String],
    trust_bundle: Option<&TrustBundle>,
) -> ValidationResult {
    validate_at(
        payload,
        expected_key,
        requested_names,
        trust_bundle,
        ASN1Time::now(),
    )
}

/// Validate `payload` with validity windows evaluated at `now`
pub fn validate_at(
    payload: &IssuancePayload,
    expected_key: &PrivateKey,
    requested_names: &[String],
    trust_bundle: Option<&TrustBundle>,
    now: ASN1Time,
) -> ValidationResult {
    let mut validator = IssuanceValidator::new(expected_key, requested_names).at(now);
    if let Some(bundle) = trust_bundle {
        validator = validator.trust_bundle(bundle);
    }
    validator.validate(payload)
}
