//! # PKI Error Types

use thiserror::Error;

/// Errors raised while loading keys, bundles and requests
///
/// Validation defects of an issued certificate are never raised; they are
/// reported in `ValidationResult`.
#[derive(Debug, Error)]
pub enum PkiError {
    /// Key, bundle or request file could not be read
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// PEM framing could not be decoded
    #[error("PEM parsing error: {0}")]
    Pem(String),

    /// No block with the expected tag was found
    #[error("no {0} block found")]
    MissingBlock(&'static str),

    /// Private key could not be loaded
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Certificate could not be parsed
    #[error("certificate parsing error: {0}")]
    InvalidCertificate(String),

    /// Certificate signing request could not be parsed or generated
    #[error("invalid CSR: {0}")]
    InvalidCsr(String),

    /// Key generation failed
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),
}

/// Result type for PKI operations
pub type Result<T> = std::result::Result<T, PkiError>;

/// Raised by `ValidationResult::into_result` when any check failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("issued certificate failed validation: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}
