//! # Wait Outcomes
//!
//! Terminal results of a wait and their conversion into errors for callers
//! that only care about success.

use super::ObservedStatus;
use crate::constants::REASON_CANCELLED;
use thiserror::Error;

/// Terminal result of one wait call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The success condition was observed
    Satisfied(ObservedStatus),
    /// A failure condition matched, the read failed terminally, the resource
    /// was deleted, or the caller cancelled
    Failed {
        reason: String,
        status: ObservedStatus,
    },
    /// The deadline passed; carries the last snapshot read
    TimedOut(ObservedStatus),
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitOutcome::Failed { reason, .. } if reason == REASON_CANCELLED)
    }

    /// Last status observed before the outcome was decided
    pub fn status(&self) -> &ObservedStatus {
        match self {
            WaitOutcome::Satisfied(status)
            | WaitOutcome::Failed { status, .. }
            | WaitOutcome::TimedOut(status) => status,
        }
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            WaitOutcome::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Label used for metrics and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitOutcome::Satisfied(_) => "satisfied",
            WaitOutcome::Failed { .. } if self.is_cancelled() => "cancelled",
            WaitOutcome::Failed { .. } => "failed",
            WaitOutcome::TimedOut(_) => "timed_out",
        }
    }

    /// Convert into a `Result`, keeping the last observed status in the error
    pub fn into_result(self) -> Result<ObservedStatus, WaitError> {
        match self {
            WaitOutcome::Satisfied(status) => Ok(status),
            WaitOutcome::Failed { reason, status } => Err(WaitError::Failed { reason, status }),
            WaitOutcome::TimedOut(status) => Err(WaitError::TimedOut { status }),
        }
    }
}

/// Non-satisfied outcome surfaced as an error
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("wait failed: {reason} (last observed: {})", .status.summary())]
    Failed {
        reason: String,
        status: ObservedStatus,
    },
    #[error("timed out waiting for condition (last observed: {})", .status.summary())]
    TimedOut { status: ObservedStatus },
}

/// Wait parameters rejected before any read was made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidWaitRequest {
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}
