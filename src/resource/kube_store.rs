//! # Kubernetes Resource Store
//!
//! `ResourceStore` backed by the Kubernetes API server and cert-manager CRDs.

use super::{
    AccessError, AccessErrorKind, IssuancePayload, NewResource, ResourceKind, ResourceRef,
    ResourceStore, StatusReader,
};
use crate::constants::FIELD_MANAGER;
use crate::crd::{CertificateRequest, Issuer};
use crate::waiter::ObservedStatus;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use tracing::debug;

/// Accessor over a live cluster
///
/// Cheap to clone; `kube::Client` is reference counted.
#[derive(Clone)]
pub struct KubeResourceStore {
    client: Client,
}

impl std::fmt::Debug for KubeResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeResourceStore").finish_non_exhaustive()
    }
}

impl KubeResourceStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn issuers(&self, namespace: &str) -> Api<Issuer> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn certificate_requests(&self, namespace: &str) -> Api<CertificateRequest> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Classify a kube client error
///
/// Anything that is neither an API status nor a decoding failure happened
/// before the API server answered and is worth retrying.
fn classify(err: &kube::Error) -> AccessErrorKind {
    match err {
        kube::Error::Api(status) => AccessErrorKind::from_status_code(status.code),
        kube::Error::SerdeError(_) => AccessErrorKind::Decode,
        _ => AccessErrorKind::Connection,
    }
}

fn access_error(operation: &str, resource: &str, err: &kube::Error) -> AccessError {
    AccessError::new(
        classify(err),
        format!("failed to {operation} {resource}: {err}"),
    )
}

fn decode_bytes_field(field: &str, resource: &ResourceRef, value: &str) -> Result<Vec<u8>, AccessError> {
    STANDARD.decode(value.trim()).map_err(|e| {
        AccessError::new(
            AccessErrorKind::Decode,
            format!("{resource}: {field} is not valid base64: {e}"),
        )
    })
}

#[async_trait]
impl StatusReader for KubeResourceStore {
    async fn read_status(&self, resource: &ResourceRef) -> Result<Option<ObservedStatus>, AccessError> {
        let status = match resource.kind() {
            ResourceKind::Issuer => self
                .issuers(resource.namespace())
                .get_opt(resource.name())
                .await
                .map_err(|e| access_error("get", &resource.to_string(), &e))?
                .map(|issuer| {
                    let conditions = issuer
                        .status
                        .map(|s| s.conditions)
                        .unwrap_or_default();
                    ObservedStatus::from_conditions(
                        &conditions,
                        issuer.metadata.resource_version.as_deref(),
                    )
                }),
            ResourceKind::CertificateRequest => self
                .certificate_requests(resource.namespace())
                .get_opt(resource.name())
                .await
                .map_err(|e| access_error("get", &resource.to_string(), &e))?
                .map(|request| {
                    let conditions = request
                        .status
                        .map(|s| s.conditions)
                        .unwrap_or_default();
                    ObservedStatus::from_conditions(
                        &conditions,
                        request.metadata.resource_version.as_deref(),
                    )
                }),
        };

        if status.is_none() {
            debug!(resource = %resource, "resource not found");
        }
        Ok(status)
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn create_resource(
        &self,
        namespace: &str,
        resource: NewResource,
    ) -> Result<ResourceRef, AccessError> {
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PostParams::default()
        };

        let created = match resource {
            NewResource::Issuer(mut issuer) => {
                issuer.metadata.namespace = Some(namespace.to_string());
                let created = self
                    .issuers(namespace)
                    .create(&params, &issuer)
                    .await
                    .map_err(|e| access_error("create", "Issuer", &e))?;
                ResourceRef::issuer(namespace, created.metadata.name.unwrap_or_default())
            }
            NewResource::CertificateRequest(mut request) => {
                request.metadata.namespace = Some(namespace.to_string());
                let created = self
                    .certificate_requests(namespace)
                    .create(&params, &request)
                    .await
                    .map_err(|e| access_error("create", "CertificateRequest", &e))?;
                ResourceRef::certificate_request(
                    namespace,
                    created.metadata.name.unwrap_or_default(),
                )
            }
        };

        debug!(resource = %created, "resource created");
        Ok(created)
    }

    async fn delete_resource(&self, resource: &ResourceRef) -> Result<(), AccessError> {
        let params = DeleteParams::default();
        let result = match resource.kind() {
            ResourceKind::Issuer => self
                .issuers(resource.namespace())
                .delete(resource.name(), &params)
                .await
                .map(|_| ()),
            ResourceKind::CertificateRequest => self
                .certificate_requests(resource.namespace())
                .delete(resource.name(), &params)
                .await
                .map(|_| ()),
        };

        match result {
            Ok(()) => {
                debug!(resource = %resource, "resource deleted");
                Ok(())
            }
            Err(kube::Error::Api(status)) if status.code == 404 => Ok(()),
            Err(e) => Err(access_error("delete", &resource.to_string(), &e)),
        }
    }

    async fn fetch_issued_artifact(&self, resource: &ResourceRef) -> Result<IssuancePayload, AccessError> {
        if resource.kind() != ResourceKind::CertificateRequest {
            return Err(AccessError::new(
                AccessErrorKind::BadRequest,
                format!("{resource} does not carry an issued certificate"),
            ));
        }

        let request = self
            .certificate_requests(resource.namespace())
            .get_opt(resource.name())
            .await
            .map_err(|e| access_error("get", &resource.to_string(), &e))?
            .ok_or_else(|| {
                AccessError::new(AccessErrorKind::NotIssued, format!("{resource} not found"))
            })?;

        let status = request.status.unwrap_or_default();
        let certificate = status
            .certificate
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                AccessError::new(
                    AccessErrorKind::NotIssued,
                    format!("{resource} has no status.certificate"),
                )
            })?;

        let mut payload = IssuancePayload::new(decode_bytes_field(
            "status.certificate",
            resource,
            certificate,
        )?);
        if let Some(ca) = status.ca.as_deref().filter(|c| !c.trim().is_empty()) {
            payload = payload.with_ca_bundle(decode_bytes_field("status.ca", resource, ca)?);
        }
        Ok(payload)
    }
}
