//! Service configuration schema for armature.toml
//!
//! The file declares the service, where it is deployed, and which template
//! generator (or hand-authored ARM template) describes its infrastructure.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::naming;
use crate::manifest::ParameterSet;

/// Slot names that address the production site rather than a slot.
pub const PRODUCTION_SLOT_ALIASES: [&str; 2] = ["production", "prod"];

/// Template type used when the configuration names none.
pub const DEFAULT_TEMPLATE_TYPE: &str = "consumption";

/// Root configuration structure for armature.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// Service name, used in derived resource names
    pub service: String,

    /// Cloud provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Directory the configuration was loaded from; relative paths resolve
    /// against it
    #[serde(skip)]
    pub service_path: PathBuf,
}

/// Provider section of armature.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Azure region, e.g. "West US 2"
    pub region: String,

    /// Deployment stage, e.g. "dev" or "prod"
    pub stage: String,

    /// Prefix for derived resource names
    pub prefix: String,

    /// Explicit resource group; derived from the naming convention if absent
    pub resource_group: Option<String>,

    pub subscription_id: Option<String>,

    /// Named template generator: consumption, premium or ase
    #[serde(rename = "type")]
    pub template_type: Option<String>,

    /// Function runtime, e.g. "node14" or "python3.8"
    pub runtime: String,

    /// Tags applied to every generated resource
    pub tags: Option<BTreeMap<String, String>>,

    /// App settings injected into the function app
    pub environment: Option<BTreeMap<String, String>>,

    pub deployment: DeploymentConfig,

    /// Hand-authored ARM template used instead of a named generator
    pub arm_template: Option<ArmTemplateConfig>,

    /// API Management gateway in front of the function app
    pub apim: Option<ApimConfig>,

    pub function_app: Option<FunctionAppConfig>,
    pub app_insights: Option<ResourceConfig>,
    pub storage_account: Option<ResourceConfig>,
    pub app_service_plan: Option<ResourceConfig>,
    pub hosting_environment: Option<ResourceConfig>,
    pub virtual_network: Option<ResourceConfig>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: "westus".to_string(),
            stage: "dev".to_string(),
            prefix: "sls".to_string(),
            resource_group: None,
            subscription_id: None,
            template_type: None,
            runtime: "node14".to_string(),
            tags: None,
            environment: None,
            deployment: DeploymentConfig::default(),
            arm_template: None,
            apim: None,
            function_app: None,
            app_insights: None,
            storage_account: None,
            app_service_plan: None,
            hosting_environment: None,
            virtual_network: None,
        }
    }
}

/// Deployment behavior
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Name of the ARM deployment; defaults to "<resource group>-deployment"
    pub name: Option<String>,

    /// Deployment slot to target
    pub slot: Option<String>,

    /// App settings that stay pinned to their slot across swaps
    pub slot_sticky_environment_variables: Option<Vec<String>>,
}

impl DeploymentConfig {
    /// True when a slot other than production is configured.
    pub fn targets_slot(&self) -> bool {
        match self.slot.as_deref() {
            Some(slot) if !slot.is_empty() => !PRODUCTION_SLOT_ALIASES.contains(&slot),
            _ => false,
        }
    }

    /// The non-production slot name, if one is targeted.
    pub fn target_slot(&self) -> Option<&str> {
        if self.targets_slot() {
            self.slot.as_deref()
        } else {
            None
        }
    }

    pub fn sticky_variables(&self) -> &[String] {
        self.slot_sticky_environment_variables
            .as_deref()
            .unwrap_or_default()
    }
}

/// File-based ARM template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmTemplateConfig {
    /// Template path, relative to the configuration file
    pub file: PathBuf,

    /// Parameter values passed alongside the template
    #[serde(default)]
    pub parameters: ParameterSet,
}

/// API Management configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApimConfig {
    pub name: Option<String>,
    pub publisher_email: Option<String>,
    pub publisher_name: Option<String>,
    pub sku: Option<SkuConfig>,

    /// Keep the gateway out of the generated template. Accepts a boolean or
    /// a string, where only the exact string "true" skips.
    #[serde(deserialize_with = "deserialize_flag")]
    pub skip_arm_template: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FunctionAppConfig {
    pub name: Option<String>,
    /// FUNCTIONS_EXTENSION_VERSION, defaults to "~3"
    pub extension_version: Option<String>,
}

/// Name and SKU overrides shared by most resources
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResourceConfig {
    pub name: Option<String>,
    pub sku: Option<SkuConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SkuConfig {
    pub name: Option<String>,
    pub tier: Option<String>,
    pub capacity: Option<u32>,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => flag,
        Flag::Text(text) => text == "true",
    })
}

impl ServiceConfig {
    /// Resource group the service deploys into.
    pub fn resource_group(&self) -> String {
        self.provider
            .resource_group
            .clone()
            .unwrap_or_else(|| naming::resource_group_name(self))
    }

    /// Name of the ARM deployment used for comparison and submission.
    pub fn deployment_name(&self) -> String {
        self.provider
            .deployment
            .name
            .clone()
            .unwrap_or_else(|| format!("{}-deployment", self.resource_group()))
    }

    /// Template generator to use when no ARM template file is configured.
    pub fn template_type(&self) -> &str {
        self.provider
            .template_type
            .as_deref()
            .unwrap_or(DEFAULT_TEMPLATE_TYPE)
    }

    /// APIM configuration, unless it opted out of template augmentation.
    pub fn apim_for_template(&self) -> Option<&ApimConfig> {
        self.provider
            .apim
            .as_ref()
            .filter(|apim| !apim.skip_arm_template)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.service.trim().is_empty() {
            anyhow::bail!("'service' must not be empty");
        }
        if let Some(template_type) = &self.provider.template_type
            && template_type.trim().is_empty()
        {
            anyhow::bail!("'provider.type' must not be empty when set");
        }
        if let Some(arm_template) = &self.provider.arm_template
            && arm_template.file.as_os_str().is_empty()
        {
            anyhow::bail!("'provider.arm_template.file' must not be empty");
        }
        if self
            .provider
            .deployment
            .sticky_variables()
            .iter()
            .any(|name| name.trim().is_empty())
        {
            anyhow::bail!("Sticky environment variable names must not be empty");
        }
        Ok(())
    }
}
