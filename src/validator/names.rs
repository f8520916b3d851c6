//! Name extraction and comparison for certificates and signing requests.
//!
//! A certificate's names are its subject alternative DNS names plus its
//! subject common name, when present. Other SAN types (IP addresses, URIs,
//! emails) are not part of the set. Comparison is set-based after
//! normalization.

use std::collections::BTreeSet;
use x509_parser::prelude::*;

/// Lowercase, trim whitespace and a single trailing root dot
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

/// Normalize a requested name list into a set
pub fn normalize_names<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| normalize_name(n.as_ref()))
        .filter(|n| !n.is_empty())
        .collect()
}

fn general_name(name: &GeneralName<'_>) -> Option<String> {
    match name {
        GeneralName::DNSName(dns) => Some(normalize_name(dns)),
        _ => None,
    }
}

fn common_names(subject: &X509Name<'_>, names: &mut BTreeSet<String>) -> Result<(), String> {
    for cn in subject.iter_common_name() {
        let value = cn
            .as_str()
            .map_err(|e| format!("subject common name is not a string: {e}"))?;
        let normalized = normalize_name(value);
        if !normalized.is_empty() {
            names.insert(normalized);
        }
    }
    Ok(())
}

/// Names carried by a certificate
pub(crate) fn certificate_names(cert: &X509Certificate<'_>) -> Result<BTreeSet<String>, String> {
    let mut names = BTreeSet::new();
    let san = cert
        .subject_alternative_name()
        .map_err(|e| format!("failed to parse subjectAltName extension: {e}"))?;
    if let Some(san) = san {
        names.extend(san.value.general_names.iter().filter_map(general_name));
    }
    common_names(cert.subject(), &mut names)?;
    Ok(names)
}

/// Names carried by a signing request
pub(crate) fn request_names(csr: &X509CertificationRequest<'_>) -> Result<BTreeSet<String>, String> {
    let mut names = BTreeSet::new();
    if let Some(extensions) = csr.requested_extensions() {
        for extension in extensions {
            if let ParsedExtension::SubjectAlternativeName(san) = extension {
                names.extend(san.general_names.iter().filter_map(general_name));
            }
        }
    }
    common_names(&csr.certification_request_info.subject, &mut names)?;
    Ok(names)
}

/// Difference between the requested names and the names actually present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NameComparison {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

impl NameComparison {
    pub fn compare(actual: &BTreeSet<String>, requested: &BTreeSet<String>) -> Self {
        Self {
            missing: requested.difference(actual).cloned().collect(),
            unexpected: actual.difference(requested).cloned().collect(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Describe each mismatch; `subject` names what was inspected
    pub fn errors(&self, subject: &str) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.missing.is_empty() {
            errors.push(format!(
                "{subject} is missing requested names: {}",
                self.missing.join(", ")
            ));
        }
        if !self.unexpected.is_empty() {
            errors.push(format!(
                "{subject} carries names that were not requested: {}",
                self.unexpected.join(", ")
            ));
        }
        errors
    }
}
