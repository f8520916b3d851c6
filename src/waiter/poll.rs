//! # Polling Loop
//!
//! The wait algorithm: one fresh read per tick, success checked before
//! failure, hard deadline measured from the start of the wait.

use super::{ConditionSpec, InvalidWaitRequest, ObservedStatus, WaitOutcome};
use crate::config::WaitConfig;
use crate::constants::{REASON_CANCELLED, REASON_DELETED, RECOMMENDED_POLLS_PER_TIMEOUT};
use crate::observability::metrics;
use crate::resource::{ResourceRef, StatusReader};
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

/// What to wait for, and for how long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitRequest {
    pub resource: ResourceRef,
    pub success: ConditionSpec,
    pub failures: Vec<ConditionSpec>,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitRequest {
    /// Wait for `success` on `resource` with the default timeout and poll interval
    pub fn new(resource: ResourceRef, success: ConditionSpec) -> Self {
        Self::with_config(resource, success, &WaitConfig::default())
    }

    pub fn with_config(resource: ResourceRef, success: ConditionSpec, config: &WaitConfig) -> Self {
        Self {
            resource,
            success,
            failures: Vec::new(),
            timeout: config.timeout,
            poll_interval: config.poll_interval,
        }
    }

    /// Abort as soon as `spec` is observed
    pub fn fail_on(mut self, spec: ConditionSpec) -> Self {
        self.failures.push(spec);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn validate(&self) -> Result<(), InvalidWaitRequest> {
        if self.timeout.is_zero() {
            return Err(InvalidWaitRequest::ZeroTimeout);
        }
        if self.poll_interval.is_zero() {
            return Err(InvalidWaitRequest::ZeroPollInterval);
        }
        Ok(())
    }

    /// First condition, in resource order, matching any failure spec.
    /// Returns the reason to report.
    fn failure_reason(&self, status: &ObservedStatus) -> Option<String> {
        status.conditions.iter().find_map(|condition| {
            self.failures
                .iter()
                .find(|spec| spec.matches(condition))
                .map(|spec| {
                    spec.reason
                        .clone()
                        .unwrap_or_else(|| condition.condition_type.clone())
                })
        })
    }
}

/// Polls resources through a `StatusReader`
///
/// Holds no state between waits; one waiter can serve any number of
/// concurrent wait calls.
#[derive(Clone, Copy)]
pub struct ConditionWaiter<'a> {
    reader: &'a dyn StatusReader,
}

impl std::fmt::Debug for ConditionWaiter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionWaiter").finish_non_exhaustive()
    }
}

impl<'a> ConditionWaiter<'a> {
    pub fn new(reader: &'a dyn StatusReader) -> Self {
        Self { reader }
    }

    /// Block until the request resolves
    ///
    /// # Errors
    ///
    /// Only when the request itself is invalid (zero timeout or poll interval).
    /// Every other result, including read failures and cancellation, is a
    /// `WaitOutcome`.
    pub async fn wait(
        &self,
        request: &WaitRequest,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome, InvalidWaitRequest> {
        request.validate()?;

        if request
            .poll_interval
            .checked_mul(RECOMMENDED_POLLS_PER_TIMEOUT)
            .is_none_or(|total| total > request.timeout)
        {
            warn!(
                resource = %request.resource,
                poll_interval_ms = request.poll_interval.as_millis(),
                timeout_ms = request.timeout.as_millis(),
                "Poll interval is more than a tenth of the timeout; the final report may be stale"
            );
        }

        let span = tracing::info_span!(
            "wait",
            resource = %request.resource,
            success = %request.success,
        );
        let started = Instant::now();
        let outcome = self.poll(request, cancel, started).instrument(span).await;

        metrics::increment_waits_total(outcome.as_str());
        metrics::observe_wait_duration(started.elapsed().as_secs_f64());
        Ok(outcome)
    }

    async fn poll(
        &self,
        request: &WaitRequest,
        cancel: &CancellationToken,
        started: Instant,
    ) -> WaitOutcome {
        let deadline = started + request.timeout;
        let mut last = ObservedStatus::default();
        let mut seen = false;
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return cancelled(last, started);
            }

            attempt += 1;
            metrics::increment_wait_polls();

            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => return cancelled(last, started),
                read = timeout_at(deadline, self.reader.read_status(&request.resource)) => read,
            };

            match read {
                Err(_) => {
                    info!(
                        attempt,
                        elapsed_ms = started.elapsed().as_millis(),
                        "Deadline passed while reading status"
                    );
                    return WaitOutcome::TimedOut(last);
                }
                Ok(Ok(Some(status))) => {
                    seen = true;
                    if status.find(&request.success).is_some() {
                        info!(
                            attempt,
                            elapsed_ms = started.elapsed().as_millis(),
                            "Condition satisfied"
                        );
                        return WaitOutcome::Satisfied(status);
                    }
                    if let Some(reason) = request.failure_reason(&status) {
                        warn!(
                            attempt,
                            reason = %reason,
                            conditions = %status.summary(),
                            "Failure condition observed"
                        );
                        return WaitOutcome::Failed { reason, status };
                    }
                    debug!(attempt, conditions = %status.summary(), "Condition not met yet");
                    last = status;
                }
                Ok(Ok(None)) if seen => {
                    warn!(attempt, "Resource disappeared after it was observed");
                    return WaitOutcome::Failed {
                        reason: REASON_DELETED.to_string(),
                        status: last,
                    };
                }
                Ok(Ok(None)) => {
                    debug!(attempt, "Resource not found yet");
                }
                Ok(Err(e)) if e.is_transient() => {
                    metrics::increment_wait_read_errors(e.kind.as_str());
                    warn!(attempt, error = %e, "Transient read error, retrying on next poll");
                }
                Ok(Err(e)) => {
                    metrics::increment_wait_read_errors(e.kind.as_str());
                    error!(attempt, error = %e, "Read failed terminally");
                    return WaitOutcome::Failed {
                        reason: e.to_string(),
                        status: last,
                    };
                }
            }

            let now = Instant::now();
            if now >= deadline {
                info!(
                    attempt,
                    elapsed_ms = started.elapsed().as_millis(),
                    conditions = %last.summary(),
                    "Timed out"
                );
                return WaitOutcome::TimedOut(last);
            }

            let pause = request.poll_interval.min(deadline - now);
            tokio::select! {
                biased;
                () = cancel.cancelled() => return cancelled(last, started),
                () = sleep(pause) => {}
            }
        }
    }
}

fn cancelled(last: ObservedStatus, started: Instant) -> WaitOutcome {
    info!(elapsed_ms = started.elapsed().as_millis(), "Wait cancelled");
    WaitOutcome::Failed {
        reason: REASON_CANCELLED.to_string(),
        status: last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waiter::{ConditionStatus, ObservedCondition};

    fn condition(t: &str, status: ConditionStatus, reason: Option<&str>) -> ObservedCondition {
        ObservedCondition {
            condition_type: t.to_string(),
            status,
            reason: reason.map(str::to_string),
            message: None,
            observed_at_revision: None,
        }
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let request = WaitRequest::new(ResourceRef::issuer("ns", "ca"), ConditionSpec::ready());
        assert_eq!(
            request.clone().timeout(Duration::ZERO).validate(),
            Err(InvalidWaitRequest::ZeroTimeout)
        );
        assert_eq!(
            request.poll_interval(Duration::ZERO).validate(),
            Err(InvalidWaitRequest::ZeroPollInterval)
        );
    }

    #[test]
    fn test_failure_reason_prefers_spec_reason() {
        let request = WaitRequest::new(
            ResourceRef::certificate_request("ns", "req"),
            ConditionSpec::ready(),
        )
        .fail_on(ConditionSpec::denied())
        .fail_on(ConditionSpec::failed());

        let denied = ObservedStatus::new(vec![condition(
            "Denied",
            ConditionStatus::True,
            Some("PolicyDenied"),
        )]);
        assert_eq!(request.failure_reason(&denied).as_deref(), Some("Denied"));

        let failed = ObservedStatus::new(vec![condition(
            "Ready",
            ConditionStatus::False,
            Some("Failed"),
        )]);
        assert_eq!(request.failure_reason(&failed).as_deref(), Some("Failed"));

        let pending = ObservedStatus::new(vec![condition(
            "Ready",
            ConditionStatus::False,
            Some("Pending"),
        )]);
        assert_eq!(request.failure_reason(&pending), None);
    }
}
