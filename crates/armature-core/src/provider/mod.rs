//! Provider seams: where previous deployments are read from and where new
//! deployments are submitted to.
//!
//! The reconciliation engine only depends on the two traits defined here.
//! [`arm::ArmClient`] implements both against the Azure Resource Manager REST
//! API; tests substitute in-memory doubles.

pub mod arm;

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::manifest::{Deployment, DeploymentErrorDetail, DeploymentRecord, Manifest, ParameterSet};

pub use arm::ArmClient;

/// Deployment mode sent with every submission.
pub const INCREMENTAL_MODE: &str = "Incremental";

/// Errors reported by a provider or manifest store.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid provider URL: {0}")]
    Url(String),

    /// The management API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Rejected {
        status: u16,
        error: Option<DeploymentErrorDetail>,
        body: String,
    },

    /// The deployment was accepted but finished in a non-success state.
    #[error("Deployment finished with state '{state}'")]
    DeploymentFailed {
        state: String,
        error: Option<DeploymentErrorDetail>,
    },

    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read access to what was previously applied to the target environment.
pub trait ManifestStore {
    /// Metadata of the named deployment, including its error detail.
    fn previous_deployment(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<DeploymentRecord>, ProviderError>> + Send;

    /// Manifest and parameters of the named deployment.
    fn previous_manifest_and_parameters(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Deployment>, ProviderError>> + Send;
}

/// The provider's deployment submission call.
pub trait DeploymentProvider {
    /// Submit the deployment and wait for its final state.
    fn create_or_update(
        &self,
        resource_group: &str,
        deployment_name: &str,
        request: &DeploymentRequest,
    ) -> impl Future<Output = Result<DeploymentExtended, ProviderError>> + Send;
}

/// Body of a deployment submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub properties: DeploymentProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentProperties {
    pub template: Manifest,
    pub parameters: ParameterSet,
    pub mode: String,
}

impl DeploymentRequest {
    /// Wrap a deployment for incremental submission.
    pub fn incremental(deployment: Deployment) -> Self {
        Self {
            properties: DeploymentProperties {
                template: deployment.manifest,
                parameters: deployment.parameters,
                mode: INCREMENTAL_MODE.to_string(),
            },
        }
    }
}

/// The provider's extended deployment result, passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentExtended {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentExtended {
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()?
            .get("provisioningState")?
            .as_str()
    }

    /// Structured error detail reported for the deployment, if any.
    pub fn error(&self) -> Option<DeploymentErrorDetail> {
        let error = self.properties.as_ref()?.get("error")?;
        serde_json::from_value(error.clone()).ok()
    }
}
