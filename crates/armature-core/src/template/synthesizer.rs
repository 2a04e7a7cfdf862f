//! Builds the deployment for a service: from a named generator or from a
//! hand-authored ARM template file.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use super::registry::TemplateRegistry;
use super::resources::ApimResource;
use super::ArmResource;
use crate::config::{ArmTemplateConfig, ServiceConfig};
use crate::error::{DeployError, DeployResult};
use crate::manifest::{Deployment, Manifest};

#[derive(Debug, Default)]
pub struct TemplateSynthesizer {
    registry: TemplateRegistry,
}

impl TemplateSynthesizer {
    pub fn new(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Build the base deployment: the configured template file if any,
    /// otherwise the configured template type.
    pub fn build(&self, config: &ServiceConfig) -> DeployResult<Deployment> {
        match &config.provider.arm_template {
            Some(arm_template) => Self::from_file(arm_template, &config.service_path),
            None => self.synthesize(config.template_type(), config),
        }
    }

    /// Generate the deployment for a named template type, merge the API
    /// gateway when configured, and tag every resource.
    pub fn synthesize(&self, template_type: &str, config: &ServiceConfig) -> DeployResult<Deployment> {
        info!(template_type, "Creating ARM template from type");

        let generator = self.registry.resolve(template_type)?;
        let mut manifest = generator.template(config)?;
        let mut parameters = generator.parameters(config)?;

        if config.apim_for_template().is_some() {
            debug!("Merging API Management into ARM template");
            let apim = ApimResource;
            manifest.merge(apim.template(config)?);
            parameters.extend(apim.parameters(config)?);
        }

        apply_tags(&mut manifest, config);
        Ok(Deployment::new(manifest, parameters))
    }

    /// Load a hand-authored template and its parameter values verbatim.
    pub fn from_file(arm_template: &ArmTemplateConfig, service_path: &Path) -> DeployResult<Deployment> {
        let path = service_path.join(&arm_template.file);
        info!(path = %path.display(), "Creating ARM template from file");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(DeployError::ManifestFileNotFound(path));
            }
            Err(source) => return Err(DeployError::ManifestFileRead { path, source }),
        };
        let manifest: Manifest = serde_json::from_str(&content)
            .map_err(|source| DeployError::ManifestParseError { path, source })?;

        Ok(Deployment::new(manifest, arm_template.parameters.clone()))
    }
}

/// Replace the tags of every top-level resource with the configured set.
fn apply_tags(manifest: &mut Manifest, config: &ServiceConfig) {
    let tags = config.provider.tags.as_ref().map(|tags| {
        Value::Object(
            tags.iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        )
    });
    for resource in &mut manifest.resources {
        resource.tags = tags.clone();
    }
}
