//! Deployment execution: inject, compare, then skip or submit.
//!
//! ```text
//! Built -> Compared -> Skipped
//!                   -> Submitting -> Succeeded
//!                                 -> Failed
//! ```

use std::fmt;

use tracing::{debug, info, warn};

use super::diagnostics::render_deployment_error;
use super::diff::are_equivalent;
use super::inject::inject_environment;
use super::parameters::prune_empty;
use crate::config::ServiceConfig;
use crate::error::{DeployError, DeployResult};
use crate::manifest::{Deployment, DeploymentRecord};
use crate::provider::{
    DeploymentExtended, DeploymentProvider, DeploymentRequest, ManifestStore, ProviderError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStage {
    Built,
    Compared,
    Skipped,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentStage::Built => "built",
            DeploymentStage::Compared => "compared",
            DeploymentStage::Skipped => "skipped",
            DeploymentStage::Submitting => "submitting",
            DeploymentStage::Succeeded => "succeeded",
            DeploymentStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Where a deployment is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub resource_group: String,
    pub deployment_name: String,
}

impl DeploymentTarget {
    pub fn new(resource_group: impl Into<String>, deployment_name: impl Into<String>) -> Self {
        Self {
            resource_group: resource_group.into(),
            deployment_name: deployment_name.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.resource_group(), config.deployment_name())
    }
}

/// A deployment that has been injected and compared against the previous
/// one, ready to be skipped or submitted.
#[derive(Debug, Clone)]
pub struct ComparedDeployment {
    deployment: Deployment,
    target: DeploymentTarget,
    unchanged: bool,
}

impl ComparedDeployment {
    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    /// True when the previous deployment already matches.
    pub fn is_unchanged(&self) -> bool {
        self.unchanged
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeploymentOutcome {
    /// Nothing changed; the provider was not called.
    Skipped,
    /// The provider's extended result, unchanged.
    Succeeded(DeploymentExtended),
}

impl DeploymentOutcome {
    pub fn stage(&self) -> DeploymentStage {
        match self {
            DeploymentOutcome::Skipped => DeploymentStage::Skipped,
            DeploymentOutcome::Succeeded(_) => DeploymentStage::Succeeded,
        }
    }
}

/// Drives one deployment against a manifest store and a provider.
///
/// Concurrent executions for the same deployment name are not serialized
/// here; the provider's own handling of overlapping deployments applies.
pub struct DeploymentExecutor<'a, S, P> {
    store: &'a S,
    provider: &'a P,
}

impl<'a, S, P> DeploymentExecutor<'a, S, P>
where
    S: ManifestStore,
    P: DeploymentProvider,
{
    pub fn new(store: &'a S, provider: &'a P) -> Self {
        Self { store, provider }
    }

    /// Inject, compare and, if anything changed, submit.
    pub async fn deploy(
        &self,
        deployment: Deployment,
        config: &ServiceConfig,
    ) -> DeployResult<DeploymentOutcome> {
        let compared = self.compare(deployment, config).await?;
        self.execute(compared).await
    }

    /// Inject the configured environment and compare against the previously
    /// applied deployment.
    pub async fn compare(
        &self,
        mut deployment: Deployment,
        config: &ServiceConfig,
    ) -> DeployResult<ComparedDeployment> {
        let target = DeploymentTarget::from_config(config);

        inject_environment(&mut deployment, config)?;
        enter(DeploymentStage::Built);

        let previous = self
            .store
            .previous_manifest_and_parameters(&target.deployment_name)
            .await
            .map_err(DeployError::Store)?;
        let unchanged = are_equivalent(Some(&deployment), previous.as_ref());
        enter(DeploymentStage::Compared);

        Ok(ComparedDeployment {
            deployment,
            target,
            unchanged,
        })
    }

    /// Skip an unchanged deployment, otherwise submit it incrementally.
    pub async fn execute(&self, compared: ComparedDeployment) -> DeployResult<DeploymentOutcome> {
        let ComparedDeployment {
            mut deployment,
            target,
            unchanged,
        } = compared;

        if unchanged {
            enter(DeploymentStage::Skipped);
            info!("Generated template same as previous. Skipping ARM deployment");
            return Ok(DeploymentOutcome::Skipped);
        }

        prune_empty(&mut deployment.parameters);
        let request = DeploymentRequest::incremental(deployment);

        enter(DeploymentStage::Submitting);
        info!(
            resource_group = %target.resource_group,
            deployment = %target.deployment_name,
            "Deploying ARM template"
        );

        match self
            .provider
            .create_or_update(&target.resource_group, &target.deployment_name, &request)
            .await
        {
            Ok(result) => {
                enter(DeploymentStage::Succeeded);
                info!("ARM deployment complete");
                Ok(DeploymentOutcome::Succeeded(result))
            }
            Err(err) => {
                enter(DeploymentStage::Failed);
                Err(self.decode_failure(&target, err).await)
            }
        }
    }

    /// Replace a submission error with the rendered error tree of the failed
    /// deployment when the store has one; otherwise keep the raw error.
    async fn decode_failure(&self, target: &DeploymentTarget, err: ProviderError) -> DeployError {
        match self.store.previous_deployment(&target.deployment_name).await {
            Ok(Some(DeploymentRecord {
                error: Some(error), ..
            })) => DeployError::DeploymentFailed(render_deployment_error(&error)),
            Ok(_) => DeployError::ProviderSubmission(err),
            Err(lookup) => {
                warn!(error = %lookup, "Unable to read deployment error details");
                DeployError::ProviderSubmission(err)
            }
        }
    }
}

fn enter(stage: DeploymentStage) {
    debug!(stage = %stage, "Deployment stage");
}
