//! # Issuance
//!
//! Helpers composing the waiter and the validator into the issuance flow:
//! generate a key and CSR, build the CertificateRequest, wait for the Issuer
//! and the request, then validate what was issued.

mod flow;
mod request;

pub use flow::{wait_issued_valid, wait_issuer_ready, IssuanceError};
pub use request::{
    build_certificate_request, generate_csr, random_dns_name, random_label, GeneratedRequest,
    KeyAlgorithm,
};
