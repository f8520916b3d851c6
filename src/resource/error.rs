//! # Access Error Types
//!
//! Errors returned by resource store accessors, classified into transient
//! (retry on the next poll) and terminal (abort the wait) failures.

use thiserror::Error;

/// Resource store access error with classification
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct AccessError {
    pub kind: AccessErrorKind,
    pub message: String,
}

impl AccessError {
    pub fn new(kind: AccessErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// Classification of access failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessErrorKind {
    /// API server throttling the client (transient)
    Throttled,
    /// API server or its storage unavailable, 5xx (transient)
    Unavailable,
    /// Connection, TLS or timeout problem reaching the API server (transient)
    Connection,
    /// Request rejected as malformed or invalid, 400/422 (terminal - caller bug)
    BadRequest,
    /// Credentials missing or rejected, 401 (terminal - configuration error)
    Unauthorized,
    /// RBAC denies the operation, 403 (terminal - configuration error)
    Forbidden,
    /// Resource already exists on create, 409 (terminal)
    Conflict,
    /// Resource kind not served by the API server (terminal - cert-manager not installed)
    UnknownKind,
    /// Response could not be decoded (terminal)
    Decode,
    /// Artifact requested before the resource carries it (terminal)
    NotIssued,
}

impl AccessErrorKind {
    /// Determine if this error is transient (retry on the next poll) or terminal
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AccessErrorKind::Throttled | AccessErrorKind::Unavailable | AccessErrorKind::Connection
        )
    }

    /// Get human-readable class string for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessErrorKind::Throttled => "throttled",
            AccessErrorKind::Unavailable => "unavailable",
            AccessErrorKind::Connection => "connection",
            AccessErrorKind::BadRequest => "bad_request",
            AccessErrorKind::Unauthorized => "unauthorized",
            AccessErrorKind::Forbidden => "forbidden",
            AccessErrorKind::Conflict => "conflict",
            AccessErrorKind::UnknownKind => "unknown_kind",
            AccessErrorKind::Decode => "decode",
            AccessErrorKind::NotIssued => "not_issued",
        }
    }

    /// Classify an HTTP status code returned by the API server
    ///
    /// 404 is not classified here: accessors report a missing object as `Ok(None)`.
    pub fn from_status_code(code: u16) -> Self {
        match code {
            401 => AccessErrorKind::Unauthorized,
            403 => AccessErrorKind::Forbidden,
            404 => AccessErrorKind::UnknownKind,
            409 => AccessErrorKind::Conflict,
            429 => AccessErrorKind::Throttled,
            500..=599 => AccessErrorKind::Unavailable,
            _ => AccessErrorKind::BadRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_classification() {
        assert!(AccessErrorKind::from_status_code(429).is_transient());
        assert!(AccessErrorKind::from_status_code(503).is_transient());
        assert!(!AccessErrorKind::from_status_code(400).is_transient());
        assert!(!AccessErrorKind::from_status_code(403).is_transient());
        assert_eq!(
            AccessErrorKind::from_status_code(422),
            AccessErrorKind::BadRequest
        );
    }

    #[test]
    fn test_error_display_includes_kind_and_message() {
        let err = AccessError::new(AccessErrorKind::Forbidden, "issuers is forbidden");
        assert_eq!(err.to_string(), "Forbidden: issuers is forbidden");
        assert!(!err.is_transient());
    }
}
