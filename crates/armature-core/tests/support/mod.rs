//! In-memory manifest store and deployment provider doubles.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use armature_core::manifest::{Deployment, DeploymentRecord};
use armature_core::provider::{
    DeploymentExtended, DeploymentProvider, DeploymentRequest, ManifestStore, ProviderError,
};
use serde_json::json;

#[derive(Default)]
pub struct InMemoryStore {
    pub previous: Mutex<Option<Deployment>>,
    pub record: Mutex<Option<DeploymentRecord>>,
    pub unavailable: bool,
}

impl InMemoryStore {
    pub fn with_previous(previous: Deployment) -> Self {
        Self {
            previous: Mutex::new(Some(previous)),
            ..Self::default()
        }
    }

    pub fn with_record(record: DeploymentRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            ..Self::default()
        }
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.unavailable {
            return Err(ProviderError::Rejected {
                status: 503,
                error: None,
                body: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl ManifestStore for InMemoryStore {
    async fn previous_deployment(
        &self,
        _name: &str,
    ) -> Result<Option<DeploymentRecord>, ProviderError> {
        self.check_available()?;
        Ok(self.record.lock().unwrap().clone())
    }

    async fn previous_manifest_and_parameters(
        &self,
        _name: &str,
    ) -> Result<Option<Deployment>, ProviderError> {
        self.check_available()?;
        Ok(self.previous.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingProvider {
    pub requests: Mutex<Vec<(String, String, DeploymentRequest)>>,
    pub calls: AtomicUsize,
    pub reject: bool,
}

impl RecordingProvider {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> DeploymentRequest {
        self.requests.lock().unwrap().last().unwrap().2.clone()
    }
}

impl DeploymentProvider for RecordingProvider {
    async fn create_or_update(
        &self,
        resource_group: &str,
        deployment_name: &str,
        request: &DeploymentRequest,
    ) -> Result<DeploymentExtended, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((
            resource_group.to_string(),
            deployment_name.to_string(),
            request.clone(),
        ));

        if self.reject {
            return Err(ProviderError::Rejected {
                status: 409,
                error: None,
                body: "{}".to_string(),
            });
        }

        Ok(DeploymentExtended {
            id: Some(format!("/deployments/{}", deployment_name)),
            name: Some(deployment_name.to_string()),
            properties: Some(json!({ "provisioningState": "Succeeded" })),
            ..DeploymentExtended::default()
        })
    }
}
