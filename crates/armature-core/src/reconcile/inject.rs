//! Environment injection into a synthesized manifest.
//!
//! Two fixed shapes are written to:
//! - `resources[type == site or slot].properties.siteConfig.appSettings`
//! - `resources[type == site].resources[name == slotconfignames].properties.appSettingNames`

use serde_json::{Value, json};
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::{DeployError, DeployResult};
use crate::manifest::{Deployment, Resource, SITE_RESOURCE_TYPE, SLOT_CONFIG_NAMES, SLOT_RESOURCE_TYPE};

/// Append the configured environment to the compute resource's app settings
/// and, when deploying the production site, the sticky names to its
/// slot-config-names declaration.
///
/// Sticky names are never written while a slot is targeted: the provider
/// only accepts `slotconfignames` on the site itself.
pub fn inject_environment(deployment: &mut Deployment, config: &ServiceConfig) -> DeployResult<()> {
    let Some(environment) = config
        .provider
        .environment
        .as_ref()
        .filter(|env| !env.is_empty())
    else {
        return Ok(());
    };

    info!("Merging environment configuration");

    let deployment_config = &config.provider.deployment;
    let is_slot = deployment_config.targets_slot();
    let target_type = if is_slot {
        SLOT_RESOURCE_TYPE
    } else {
        SITE_RESOURCE_TYPE
    };

    let settings: Vec<Value> = environment
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();

    let mut found = false;
    for resource in deployment
        .manifest
        .resources
        .iter_mut()
        .filter(|r| r.is_type(target_type))
    {
        if let Some(app_settings) = app_settings_mut(resource) {
            app_settings.extend(settings.iter().cloned());
            found = true;
        }
    }
    if !found {
        return Err(DeployError::StructuralPathNotFound(format!(
            "{} resource with properties.siteConfig.appSettings",
            target_type
        )));
    }

    let sticky = deployment_config.sticky_variables();
    if is_slot || sticky.is_empty() {
        return Ok(());
    }

    let mut found = false;
    for site in deployment
        .manifest
        .resources
        .iter_mut()
        .filter(|r| r.is_type(SITE_RESOURCE_TYPE))
    {
        for child in site.resources.iter_mut().flatten() {
            if child.name.as_deref() != Some(SLOT_CONFIG_NAMES) {
                continue;
            }
            if let Some(names) = app_setting_names_mut(child) {
                names.extend(sticky.iter().cloned().map(Value::String));
                found = true;
            }
        }
    }
    if !found {
        return Err(DeployError::StructuralPathNotFound(format!(
            "{} resource with a {} child declaring properties.appSettingNames",
            SITE_RESOURCE_TYPE, SLOT_CONFIG_NAMES
        )));
    }

    Ok(())
}

fn app_settings_mut(resource: &mut Resource) -> Option<&mut Vec<Value>> {
    resource
        .properties
        .as_mut()?
        .get_mut("siteConfig")?
        .get_mut("appSettings")?
        .as_array_mut()
}

fn app_setting_names_mut(resource: &mut Resource) -> Option<&mut Vec<Value>> {
    resource
        .properties
        .as_mut()?
        .get_mut("appSettingNames")?
        .as_array_mut()
}
