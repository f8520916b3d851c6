//! # Constants
//!
//! Default values shared by the waiter, the issuance helpers and the CLI.

/// Default hard deadline for a single wait (seconds)
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 30;

/// Default interval between two status reads (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default deadline for an Issuer to become Ready (seconds)
/// Issuers backed by an external CA need longer than requests to settle
pub const DEFAULT_ISSUER_READY_TIMEOUT_SECS: u64 = 60;

/// Poll intervals above `timeout / RECOMMENDED_POLLS_PER_TIMEOUT` are logged as a warning
pub const RECOMMENDED_POLLS_PER_TIMEOUT: u32 = 10;

/// Longest certificate path the chain builder will follow (leaf excluded)
pub const MAX_CHAIN_DEPTH: usize = 8;

/// cert-manager API group
pub const CERT_MANAGER_GROUP: &str = "cert-manager.io";

/// Condition types and reasons used by cert-manager
pub const CONDITION_READY: &str = "Ready";
pub const CONDITION_DENIED: &str = "Denied";
pub const CONDITION_INVALID_REQUEST: &str = "InvalidRequest";
pub const REASON_FAILED: &str = "Failed";

/// Failure reasons reported by the waiter that do not come from a condition
pub const REASON_CANCELLED: &str = "cancelled";
pub const REASON_DELETED: &str = "deleted";

/// Field manager name used when creating resources
pub const FIELD_MANAGER: &str = "civctl";
