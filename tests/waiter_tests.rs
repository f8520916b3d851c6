//! # Condition Waiter Tests
//!
//! Time-driven tests against a scripted store on a paused tokio clock.
//!
//! These tests verify:
//! - Satisfied, Failed and TimedOut timing relative to condition transitions
//! - Not-found propagation lag, deletion and read error classification
//! - Cancellation, hung reads and deadline capping

mod common;

use cert_issuance_verifier::waiter::InvalidWaitRequest;
use cert_issuance_verifier::{
    AccessErrorKind, ConditionSpec, ConditionStatus, ConditionWaiter, ResourceRef, WaitOutcome,
    WaitRequest,
};
use common::{secs, Step, TimelineStore};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use ConditionStatus::{False, True};

fn issuer_ready() -> WaitRequest {
    WaitRequest::new(ResourceRef::issuer("e2e", "ca-issuer"), ConditionSpec::ready())
        .timeout(secs(30))
        .poll_interval(secs(2))
}

fn request_issued() -> WaitRequest {
    WaitRequest::new(
        ResourceRef::certificate_request("e2e", "request"),
        ConditionSpec::ready(),
    )
    .fail_on(ConditionSpec::denied())
    .fail_on(ConditionSpec::invalid_request())
    .fail_on(ConditionSpec::failed())
    .timeout(secs(60))
    .poll_interval(secs(2))
}

async fn run(store: &TimelineStore, request: &WaitRequest) -> (WaitOutcome, Duration) {
    let started = Instant::now();
    let outcome = ConditionWaiter::new(store)
        .wait(request, &CancellationToken::new())
        .await
        .unwrap();
    (outcome, started.elapsed())
}

#[tokio::test(start_paused = true)]
async fn test_issuer_never_ready_times_out_at_deadline() {
    let store = TimelineStore::new().at(
        secs(0),
        Step::Conditions(vec![("Ready", False, Some("Pending"))]),
    );

    let (outcome, elapsed) = run(&store, &issuer_ready()).await;

    assert!(matches!(outcome, WaitOutcome::TimedOut(_)), "{outcome:?}");
    assert_eq!(elapsed, secs(30));
    assert_eq!(
        outcome.status().get("Ready").map(|c| c.status),
        Some(False)
    );
    // Reads at 0, 2, ..., 30
    assert_eq!(store.read_count(), 16);
}

#[tokio::test(start_paused = true)]
async fn test_absent_resource_times_out_with_empty_status() {
    let store = TimelineStore::new();

    let (outcome, elapsed) = run(&store, &issuer_ready()).await;

    assert!(matches!(outcome, WaitOutcome::TimedOut(_)));
    assert!(elapsed >= secs(30));
    assert!(outcome.status().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_denied_fails_on_the_poll_it_appears() {
    let store = TimelineStore::new()
        .at(
            secs(0),
            Step::Conditions(vec![("Ready", False, Some("Pending"))]),
        )
        .at(
            secs(4),
            Step::Conditions(vec![
                ("Denied", True, Some("PolicyDenied")),
                ("Ready", False, Some("Denied")),
            ]),
        );

    let (outcome, elapsed) = run(&store, &request_issued()).await;

    assert_eq!(outcome.reason(), Some("Denied"));
    assert!(!outcome.is_cancelled());
    assert_eq!(elapsed, secs(4));
    assert_eq!(store.read_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_satisfied_within_one_poll_of_transition() {
    let store = TimelineStore::new()
        .at(
            secs(0),
            Step::Conditions(vec![("Ready", False, Some("Pending"))]),
        )
        .at(secs(5), Step::Conditions(vec![("Ready", True, Some("Issued"))]));

    let (outcome, elapsed) = run(&store, &request_issued()).await;

    assert!(outcome.is_satisfied());
    assert!(elapsed >= secs(5));
    assert!(elapsed < secs(5) + secs(2));
    assert!(elapsed < secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_already_satisfied_returns_after_one_read() {
    let store =
        TimelineStore::new().at(secs(0), Step::Conditions(vec![("Ready", True, None)]));

    let (outcome, elapsed) = run(&store, &issuer_ready()).await;

    assert!(outcome.is_satisfied());
    assert_eq!(elapsed, Duration::ZERO);
    assert_eq!(store.read_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_checked_before_failure() {
    let store = TimelineStore::new().at(
        secs(0),
        Step::Conditions(vec![("Denied", True, None), ("Ready", True, None)]),
    );

    let (outcome, _) = run(&store, &request_issued()).await;

    assert!(outcome.is_satisfied());
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_retried_until_created() {
    let store = TimelineStore::new()
        .at(secs(0), Step::NotFound)
        .at(secs(3), Step::Conditions(vec![("Ready", True, None)]));

    let (outcome, elapsed) = run(&store, &issuer_ready()).await;

    assert!(outcome.is_satisfied());
    assert_eq!(elapsed, secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_deletion_after_observation_fails() {
    let store = TimelineStore::new()
        .at(
            secs(0),
            Step::Conditions(vec![("Ready", False, Some("Pending"))]),
        )
        .at(secs(3), Step::NotFound);

    let (outcome, elapsed) = run(&store, &request_issued()).await;

    assert_eq!(outcome.reason(), Some("deleted"));
    assert_eq!(elapsed, secs(4));
    assert_eq!(
        outcome.status().get("Ready").and_then(|c| c.reason.as_deref()),
        Some("Pending")
    );
}

#[tokio::test(start_paused = true)]
async fn test_transient_read_errors_are_retried() {
    let store = TimelineStore::new()
        .at(secs(0), Step::Error(AccessErrorKind::Unavailable))
        .at(secs(2), Step::Error(AccessErrorKind::Throttled))
        .at(secs(3), Step::Conditions(vec![("Ready", True, None)]));

    let (outcome, elapsed) = run(&store, &issuer_ready()).await;

    assert!(outcome.is_satisfied());
    assert_eq!(elapsed, secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_terminal_read_error_fails_without_retry() {
    let store = TimelineStore::new().at(secs(0), Step::Error(AccessErrorKind::Forbidden));

    let (outcome, elapsed) = run(&store, &issuer_ready()).await;

    let reason = outcome.reason().unwrap_or_default();
    assert!(reason.contains("Forbidden"), "{reason}");
    assert_eq!(elapsed, Duration::ZERO);
    assert_eq!(store.read_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reason_narrows_failure_match() {
    let store = TimelineStore::new()
        .at(
            secs(0),
            Step::Conditions(vec![("Ready", False, Some("Pending"))]),
        )
        .at(
            secs(6),
            Step::Conditions(vec![("Ready", False, Some("Failed"))]),
        );

    let (outcome, elapsed) = run(&store, &request_issued()).await;

    assert_eq!(outcome.reason(), Some("Failed"));
    assert_eq!(elapsed, secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_last_sleep_is_capped_at_deadline() {
    let store = TimelineStore::new();
    let request = issuer_ready().timeout(secs(5));

    let (outcome, elapsed) = run(&store, &request).await;

    assert!(matches!(outcome, WaitOutcome::TimedOut(_)));
    assert_eq!(elapsed, secs(5));
    assert_eq!(
        store.read_times(),
        vec![secs(0), secs(2), secs(4), secs(5)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_hung_read_is_bounded_by_deadline() {
    let store = TimelineStore::new().at(secs(0), Step::Hang);
    let request = issuer_ready().timeout(secs(10));

    let (outcome, elapsed) = run(&store, &request).await;

    assert!(matches!(outcome, WaitOutcome::TimedOut(_)));
    assert_eq!(elapsed, secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_sleep() {
    let store = TimelineStore::new().at(
        secs(0),
        Step::Conditions(vec![("Ready", False, Some("Pending"))]),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(secs(5)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = ConditionWaiter::new(&store)
        .wait(&issuer_ready(), &cancel)
        .await
        .unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(outcome.reason(), Some("cancelled"));
    assert!(!matches!(outcome, WaitOutcome::TimedOut(_)));
    assert_eq!(started.elapsed(), secs(5));
    assert_eq!(
        outcome.status().get("Ready").map(|c| c.status),
        Some(False)
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_hung_read() {
    let store = TimelineStore::new().at(secs(0), Step::Hang);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(secs(3)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = ConditionWaiter::new(&store)
        .wait(&issuer_ready(), &cancel)
        .await
        .unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(started.elapsed(), secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start_makes_no_read() {
    let store = TimelineStore::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = ConditionWaiter::new(&store)
        .wait(&issuer_ready(), &cancel)
        .await
        .unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(store.read_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_request_is_rejected_before_reading() {
    let store = TimelineStore::new();
    let waiter = ConditionWaiter::new(&store);
    let cancel = CancellationToken::new();

    let zero_timeout = issuer_ready().timeout(Duration::ZERO);
    assert_eq!(
        waiter.wait(&zero_timeout, &cancel).await.unwrap_err(),
        InvalidWaitRequest::ZeroTimeout
    );

    let zero_poll = issuer_ready().poll_interval(Duration::ZERO);
    assert_eq!(
        waiter.wait(&zero_poll, &cancel).await.unwrap_err(),
        InvalidWaitRequest::ZeroPollInterval
    );

    assert_eq!(store.read_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_waits_are_independent() {
    let ready = TimelineStore::new().at(secs(2), Step::Conditions(vec![("Ready", True, None)]));
    let denied = TimelineStore::new().at(secs(4), Step::Conditions(vec![("Denied", True, None)]));
    let cancel = CancellationToken::new();
    let issuer = issuer_ready();
    let request = request_issued();

    let ready_waiter = ConditionWaiter::new(&ready);
    let denied_waiter = ConditionWaiter::new(&denied);
    let (first, second) = tokio::join!(
        ready_waiter.wait(&issuer, &cancel),
        denied_waiter.wait(&request, &cancel),
    );

    assert!(first.unwrap().is_satisfied());
    assert_eq!(second.unwrap().reason(), Some("Denied"));
}

#[tokio::test(start_paused = true)]
async fn test_into_result_reports_last_observed_conditions() {
    let store = TimelineStore::new().at(
        secs(0),
        Step::Conditions(vec![("Ready", False, Some("Pending"))]),
    );

    let (outcome, _) = run(&store, &issuer_ready().timeout(secs(4))).await;
    let err = outcome.into_result().unwrap_err();

    assert_eq!(
        err.to_string(),
        "timed out waiting for condition (last observed: Ready=False (Pending))"
    );
}
