//! # Condition Waiter
//!
//! Polls a resource's conditions until a success condition holds, a failure
//! condition is observed, the deadline passes or the caller cancels.

mod condition;
mod outcome;
mod poll;

pub use condition::{ConditionSpec, ConditionStatus, ObservedCondition, ObservedStatus};
pub use outcome::{InvalidWaitRequest, WaitError, WaitOutcome};
pub use poll::{ConditionWaiter, WaitRequest};
