//! Resource fragments the built-in templates are assembled from.

pub mod apim;
pub mod app_insights;
pub mod app_service_plan;
pub mod function_app;
pub mod hosting_environment;
pub mod storage_account;
pub mod virtual_network;

pub use apim::ApimResource;
pub use app_insights::AppInsightsResource;
pub use app_service_plan::AppServicePlanResource;
pub use function_app::{FunctionAppResource, FunctionRuntime, HostingPlan};
pub use hosting_environment::HostingEnvironmentResource;
pub use storage_account::StorageAccountResource;
pub use virtual_network::VirtualNetworkResource;

use serde_json::{Value, json};

use crate::config::{ResourceConfig, ServiceConfig, naming};
use crate::manifest::{Parameter, ParameterDeclaration};

/// Location expression shared by every generated resource.
pub(crate) const LOCATION: &str = "[parameters('location')]";

/// `[parameters('<name>')]`
pub(crate) fn param(name: &str) -> String {
    format!("[parameters('{}')]", name)
}

/// `[resourceId('<type>', parameters('<name>'))]`
pub(crate) fn resource_id(resource_type: &str, name_parameter: &str) -> String {
    format!(
        "[resourceId('{}', parameters('{}'))]",
        resource_type, name_parameter
    )
}

pub(crate) fn system_assigned_identity() -> Value {
    json!({ "type": "SystemAssigned" })
}

pub(crate) fn location_declaration() -> (String, ParameterDeclaration) {
    (
        "location".to_string(),
        ParameterDeclaration::string().with_default("[resourceGroup().location]"),
    )
}

pub(crate) fn location_parameter(config: &ServiceConfig) -> (String, Parameter) {
    ("location".to_string(), Parameter::value(config.provider.region.as_str()))
}

/// Insert a value only when configured; unset values resolve to the
/// declaration's default.
pub(crate) fn insert_configured<V: Into<Value>>(
    parameters: &mut crate::manifest::ParameterSet,
    name: &str,
    value: Option<V>,
) {
    if let Some(value) = value {
        parameters.insert(name.to_string(), Parameter::value(value));
    }
}

fn configured_name(resource: Option<&ResourceConfig>) -> Option<&str> {
    resource.and_then(|r| r.name.as_deref())
}

pub(crate) fn function_app_name(config: &ServiceConfig) -> String {
    let configured = config
        .provider
        .function_app
        .as_ref()
        .and_then(|f| f.name.as_deref());
    naming::resource_name(config, configured, &config.service, false)
}

pub(crate) fn app_insights_name(config: &ServiceConfig) -> String {
    naming::resource_name(
        config,
        configured_name(config.provider.app_insights.as_ref()),
        "appinsights",
        false,
    )
}

pub(crate) fn app_service_plan_name(config: &ServiceConfig) -> String {
    naming::resource_name(
        config,
        configured_name(config.provider.app_service_plan.as_ref()),
        "asp",
        false,
    )
}

pub(crate) fn hosting_environment_name(config: &ServiceConfig) -> String {
    naming::resource_name(
        config,
        configured_name(config.provider.hosting_environment.as_ref()),
        "ase",
        true,
    )
}

pub(crate) fn virtual_network_name(config: &ServiceConfig) -> String {
    naming::resource_name(
        config,
        configured_name(config.provider.virtual_network.as_ref()),
        "vnet",
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_reference_parameters() {
        assert_eq!(param("location"), "[parameters('location')]");
        assert_eq!(
            resource_id("Microsoft.Web/serverfarms", "appServicePlanName"),
            "[resourceId('Microsoft.Web/serverfarms', parameters('appServicePlanName'))]"
        );
    }

    #[test]
    fn configured_names_override_conventions() {
        let mut config = ServiceConfig {
            service: "orders".to_string(),
            ..ServiceConfig::default()
        };
        assert_eq!(function_app_name(&config), "sls-wus-dev-orders");
        assert_eq!(app_insights_name(&config), "sls-wus-dev-appinsights");

        config.provider.app_insights = Some(ResourceConfig {
            name: Some("shared-insights".to_string()),
            sku: None,
        });
        assert_eq!(app_insights_name(&config), "shared-insights");
    }
}
