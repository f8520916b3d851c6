//! Wait helpers for Issuers and CertificateRequests.

use crate::config::WaitConfig;
use crate::resource::{AccessError, ResourceRef, ResourceStore, StatusReader};
use crate::validator::{IssuanceValidator, PkiError, ValidationResult};
use crate::waiter::{ConditionSpec, ConditionWaiter, InvalidWaitRequest, ObservedStatus, WaitError, WaitRequest};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Errors of the composed issuance flow
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidWaitRequest),

    #[error("{resource}: {source}")]
    Wait {
        resource: ResourceRef,
        #[source]
        source: WaitError,
    },

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Pki(#[from] PkiError),
}

/// Wait for an Issuer to report `Ready=True`
///
/// Aborts early on `Ready=False` with reason `Failed`.
pub async fn wait_issuer_ready(
    reader: &dyn StatusReader,
    issuer: &ResourceRef,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<ObservedStatus, IssuanceError> {
    let request = WaitRequest::with_config(issuer.clone(), ConditionSpec::ready(), config)
        .timeout(config.issuer_ready_timeout)
        .fail_on(ConditionSpec::failed());

    let outcome = ConditionWaiter::new(reader).wait(&request, cancel).await?;
    let status = outcome.into_result().map_err(|source| IssuanceError::Wait {
        resource: issuer.clone(),
        source,
    })?;
    info!(resource = %issuer, "Issuer is ready");
    Ok(status)
}

/// Wait for a CertificateRequest to be issued, then validate the result
///
/// Aborts early when the request is denied, invalid or failed. Validation
/// defects are returned in the `ValidationResult`, not as an error.
pub async fn wait_issued_valid<S>(
    store: &S,
    request: &ResourceRef,
    validator: &IssuanceValidator<'_>,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<ValidationResult, IssuanceError>
where
    S: ResourceStore,
{
    let wait = WaitRequest::with_config(request.clone(), ConditionSpec::ready(), config)
        .fail_on(ConditionSpec::denied())
        .fail_on(ConditionSpec::invalid_request())
        .fail_on(ConditionSpec::failed());

    let outcome = ConditionWaiter::new(store).wait(&wait, cancel).await?;
    outcome.into_result().map_err(|source| IssuanceError::Wait {
        resource: request.clone(),
        source,
    })?;

    let payload = store.fetch_issued_artifact(request).await?;
    info!(resource = %request, "CertificateRequest issued, validating certificate");
    Ok(validator.validate(&payload))
}
