//! PEM helpers shared by the validator checks.

use super::error::{PkiError, Result};
use std::path::Path;
use x509_parser::prelude::*;

pub(crate) const CERTIFICATE_TAG: &str = "CERTIFICATE";
pub(crate) const CSR_TAG: &str = "CERTIFICATE REQUEST";
pub(crate) const LEGACY_CSR_TAG: &str = "NEW CERTIFICATE REQUEST";

/// Read a PEM file
pub(crate) fn read_pem_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| PkiError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// DER contents of every block tagged `tag`, in document order
pub(crate) fn der_blocks(pem_data: &[u8], tag: &str) -> Result<Vec<Vec<u8>>> {
    let blocks = ::pem::parse_many(pem_data)
        .map_err(|e| PkiError::Pem(format!("failed to parse PEM: {e}")))?;
    Ok(blocks
        .into_iter()
        .filter(|block| block.tag() == tag)
        .map(|block| block.into_contents())
        .collect())
}

/// Parse every DER blob as a certificate, failing on the first invalid one
pub(crate) fn parse_certificates(ders: &[Vec<u8>]) -> Result<Vec<X509Certificate<'_>>> {
    ders.iter()
        .enumerate()
        .map(|(index, der)| {
            X509Certificate::from_der(der)
                .map(|(_, cert)| cert)
                .map_err(|e| {
                    PkiError::InvalidCertificate(format!("certificate #{index}: {e}"))
                })
        })
        .collect()
}
