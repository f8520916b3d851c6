//! # Certificate Issuance Verifier
//!
//! End-to-end verification of certificate issuance against cert-manager.
//!
//! ## Overview
//!
//! Two independent building blocks, plus helpers composing them:
//!
//! 1. **Condition waiter** - polls a resource's status conditions until a
//!    success condition holds, a failure condition appears, a hard deadline
//!    passes or the caller cancels ([`waiter`])
//! 2. **Issuance validator** - checks an issued certificate against the
//!    private key and names that were requested, and optionally against a
//!    trust bundle and the original CSR ([`validator`])
//! 3. **Issuance helpers** - CSR generation, CertificateRequest construction
//!    and the composed "wait until issued, then validate" flow ([`issuance`])
//!
//! Resources are read through the [`resource::StatusReader`] and
//! [`resource::ResourceStore`] traits; [`resource::KubeResourceStore`]
//! implements them against a live cluster.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = runtime::connect().await?;
//! let request = WaitRequest::new(ResourceRef::issuer("e2e", "ca"), ConditionSpec::ready())
//!     .fail_on(ConditionSpec::failed());
//! let outcome = ConditionWaiter::new(&store)
//!     .wait(&request, &CancellationToken::new())
//!     .await?;
//! ```

pub mod config;
pub mod constants;
pub mod crd;
pub mod issuance;
pub mod observability;
pub mod resource;
pub mod runtime;
pub mod validator;
pub mod waiter;

pub use config::WaitConfig;
pub use resource::{
    AccessError, AccessErrorKind, IssuancePayload, KubeResourceStore, NewResource, ResourceKind,
    ResourceRef, ResourceStore, StatusReader,
};
pub use validator::{
    validate, validate_at, IssuanceValidator, PrivateKey, TrustBundle, ValidationResult,
};
pub use waiter::{
    ConditionSpec, ConditionStatus, ConditionWaiter, ObservedCondition, ObservedStatus,
    WaitOutcome, WaitRequest,
};
