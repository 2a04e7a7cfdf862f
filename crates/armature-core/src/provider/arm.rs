//! Azure Resource Manager REST client.
//!
//! Serves as both the manifest store (reads back previous deployments and
//! their exported templates) and the submission call. Authentication is a
//! bearer token obtained by the caller.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{
    DeploymentExtended, DeploymentProvider, DeploymentRequest, ManifestStore, ProviderError,
};
use crate::manifest::{
    Deployment, DeploymentErrorDetail, DeploymentRecord, Manifest, ParameterSet,
};

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com/";
pub const API_VERSION: &str = "2021-04-01";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("armature/", env!("CARGO_PKG_VERSION"));

/// ARM client scoped to one subscription and resource group.
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: Url,
    subscription_id: String,
    resource_group: String,
    access_token: String,
    poll_interval: Duration,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: DeploymentErrorDetail,
}

#[derive(Deserialize)]
struct ExportTemplateResult {
    template: Manifest,
}

impl ArmClient {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        let endpoint = parse_endpoint(DEFAULT_ENDPOINT)?;

        Ok(Self {
            http,
            endpoint,
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            access_token: access_token.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Point the client at another management endpoint (sovereign clouds,
    /// local doubles).
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ProviderError> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    /// Interval between provisioning state checks while a deployment runs.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// `.../resourcegroups/{rg}/providers/Microsoft.Resources/deployments/{name}[/{action}]`
    pub fn deployment_url(
        &self,
        resource_group: &str,
        deployment_name: &str,
        action: Option<&str>,
    ) -> Result<Url, ProviderError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ProviderError::Url(format!("{} cannot be a base", self.endpoint)))?;
            segments.pop_if_empty().extend([
                "subscriptions",
                self.subscription_id.as_str(),
                "resourcegroups",
                resource_group,
                "providers",
                "Microsoft.Resources",
                "deployments",
                deployment_name,
            ]);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    async fn get_deployment(
        &self,
        resource_group: &str,
        deployment_name: &str,
    ) -> Result<Option<DeploymentExtended>, ProviderError> {
        let url = self.deployment_url(resource_group, deployment_name, None)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let extended = check_status(response).await?.json().await?;
        Ok(Some(extended))
    }

    async fn export_template(&self, deployment_name: &str) -> Result<Option<Manifest>, ProviderError> {
        let url = self.deployment_url(&self.resource_group, deployment_name, Some("exportTemplate"))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = check_status(response).await?.text().await?;
        let exported: ExportTemplateResult = serde_json::from_str(&body)?;
        Ok(Some(exported.template))
    }
}

impl ManifestStore for ArmClient {
    async fn previous_deployment(
        &self,
        name: &str,
    ) -> Result<Option<DeploymentRecord>, ProviderError> {
        let Some(extended) = self.get_deployment(&self.resource_group, name).await? else {
            return Ok(None);
        };

        Ok(Some(DeploymentRecord {
            name: name.to_string(),
            provisioning_state: extended.provisioning_state().map(str::to_string),
            deployment: None,
            error: extended.error(),
        }))
    }

    async fn previous_manifest_and_parameters(
        &self,
        name: &str,
    ) -> Result<Option<Deployment>, ProviderError> {
        let Some(extended) = self.get_deployment(&self.resource_group, name).await? else {
            return Ok(None);
        };
        let Some(template) = self.export_template(name).await? else {
            return Ok(None);
        };

        let parameters = match extended.properties.as_ref().and_then(|p| p.get("parameters")) {
            Some(Value::Null) | None => ParameterSet::new(),
            Some(parameters) => serde_json::from_value(parameters.clone())?,
        };

        Ok(Some(Deployment::new(template, parameters)))
    }
}

impl DeploymentProvider for ArmClient {
    async fn create_or_update(
        &self,
        resource_group: &str,
        deployment_name: &str,
        request: &DeploymentRequest,
    ) -> Result<DeploymentExtended, ProviderError> {
        let url = self.deployment_url(resource_group, deployment_name, None)?;
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        let mut extended: DeploymentExtended = check_status(response).await?.json().await?;

        loop {
            let state = extended
                .provisioning_state()
                .unwrap_or("Accepted")
                .to_string();
            match state.as_str() {
                "Succeeded" => {
                    info!(deployment = deployment_name, "ARM deployment succeeded");
                    return Ok(extended);
                }
                "Failed" | "Canceled" => {
                    return Err(ProviderError::DeploymentFailed {
                        error: extended.error(),
                        state: state.clone(),
                    });
                }
                _ => debug!(deployment = deployment_name, state = %state, "Waiting for ARM deployment"),
            }

            tokio::time::sleep(self.poll_interval).await;

            extended = self
                .get_deployment(resource_group, deployment_name)
                .await?
                .ok_or_else(|| ProviderError::Rejected {
                    status: StatusCode::NOT_FOUND.as_u16(),
                    error: None,
                    body: format!("Deployment '{}' disappeared while running", deployment_name),
                })?;
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ProviderError> {
    Url::parse(endpoint).map_err(|e| ProviderError::Url(format!("{}: {}", endpoint, e)))
}

/// Turn a non-success response into [`ProviderError::Rejected`], decoding the
/// ARM error envelope when the body carries one.
async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .map(|envelope| envelope.error);

    Err(ProviderError::Rejected {
        status: status.as_u16(),
        error,
        body,
    })
}
