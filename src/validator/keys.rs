//! # Keys
//!
//! Caller-held private keys and native public key comparison.
//!
//! Keys are compared by their mathematical value, never by the bytes of an
//! encoding: RSA by modulus and exponent, EC by curve and point, anything
//! else (Ed25519, Ed448, ...) by the raw key bits.

use super::error::{PkiError, Result};
use super::pem::read_pem_file;
use rcgen::{KeyPair, PublicKeyData};
use std::path::Path;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;
use zeroize::Zeroizing;

/// Private key the issued certificate is expected to pair with
///
/// The PEM text is wiped from memory on drop.
pub struct PrivateKey {
    pem: Zeroizing<String>,
    public_key_der: Vec<u8>,
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("pem", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self {
            pem: Zeroizing::new(self.pem.as_str().to_owned()),
            public_key_der: self.public_key_der.clone(),
        }
    }
}

impl PrivateKey {
    /// Load a PEM private key
    ///
    /// Accepts PKCS#8 (`PRIVATE KEY`), SEC1 (`EC PRIVATE KEY`) and PKCS#1
    /// (`RSA PRIVATE KEY`) encodings of ECDSA, Ed25519 and RSA keys.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key_pair = KeyPair::from_pem(pem)
            .map_err(|e| PkiError::InvalidKey(format!("failed to load private key: {e}")))?;
        Ok(Self {
            pem: Zeroizing::new(pem.to_owned()),
            public_key_der: key_pair.subject_public_key_info(),
        })
    }

    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let bytes = Zeroizing::new(read_pem_file(path)?);
        let pem = std::str::from_utf8(&bytes)
            .map_err(|e| PkiError::InvalidKey(format!("{} is not UTF-8: {e}", path.display())))?;
        Self::from_pem(pem)
    }

    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        Self {
            pem: Zeroizing::new(key_pair.serialize_pem()),
            public_key_der: key_pair.subject_public_key_info(),
        }
    }

    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// SubjectPublicKeyInfo DER of the public counterpart
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// Rebuild the signing key pair, e.g. to sign a CSR
    pub fn key_pair(&self) -> Result<KeyPair> {
        KeyPair::from_pem(&self.pem)
            .map_err(|e| PkiError::InvalidKey(format!("failed to load private key: {e}")))
    }

    /// Compare this key's public counterpart with a certificate or CSR key
    pub(crate) fn matches(&self, other: &SubjectPublicKeyInfo<'_>) -> std::result::Result<bool, String> {
        let (_, own) = SubjectPublicKeyInfo::from_der(&self.public_key_der)
            .map_err(|e| format!("failed to parse public key of the private key: {e}"))?;
        same_public_key(&own, other)
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Whether two SubjectPublicKeyInfos hold the same key
pub(crate) fn same_public_key(
    a: &SubjectPublicKeyInfo<'_>,
    b: &SubjectPublicKeyInfo<'_>,
) -> std::result::Result<bool, String> {
    if a.algorithm.algorithm != b.algorithm.algorithm {
        return Ok(false);
    }

    let parsed_a = a
        .parsed()
        .map_err(|e| format!("failed to decode public key: {e}"))?;
    let parsed_b = b
        .parsed()
        .map_err(|e| format!("failed to decode public key: {e}"))?;

    Ok(match (parsed_a, parsed_b) {
        (PublicKey::RSA(x), PublicKey::RSA(y)) => {
            strip_leading_zeros(x.modulus) == strip_leading_zeros(y.modulus)
                && strip_leading_zeros(x.exponent) == strip_leading_zeros(y.exponent)
        }
        (PublicKey::EC(x), PublicKey::EC(y)) => {
            let curve_a = a.algorithm.parameters.as_ref().and_then(|p| p.as_oid().ok());
            let curve_b = b.algorithm.parameters.as_ref().and_then(|p| p.as_oid().ok());
            curve_a == curve_b && x.data() == y.data()
        }
        _ => a.subject_public_key.data[..] == b.subject_public_key.data[..],
    })
}
