//! Function app site, its optional deployment slot, and the slot-config-names
//! declaration environment injection writes sticky settings into.

use serde_json::{Value, json};

use super::{
    LOCATION, app_insights_name, app_service_plan_name, function_app_name,
    hosting_environment_name, insert_configured, location_declaration, location_parameter, param,
    resource_id, system_assigned_identity,
};
use crate::config::{ServiceConfig, naming};
use crate::error::{DeployError, DeployResult};
use crate::manifest::{
    Manifest, Parameter, ParameterDeclaration, ParameterDeclarations, ParameterSet, Resource,
    SITE_RESOURCE_TYPE, SLOT_CONFIG_NAMES, SLOT_RESOURCE_TYPE,
};
use crate::template::ArmResource;

const SITE_API_VERSION: &str = "2019-08-01";
const FUNCTION_APP_KIND: &str = "functionapp";
const DEFAULT_EXTENSION_VERSION: &str = "~3";

const STORAGE_CONNECTION_STRING: &str = "[concat('DefaultEndpointsProtocol=https;AccountName=', parameters('storageAccountName'), ';AccountKey=', listKeys(resourceId('Microsoft.Storage/storageAccounts', parameters('storageAccountName')), '2019-06-01').keys[0].value)]";
const INSTRUMENTATION_KEY: &str = "[reference(concat('microsoft.insights/components/', parameters('appInsightsName'))).InstrumentationKey]";

/// Where the function app's compute comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingPlan {
    /// Dynamic plan created implicitly by the platform
    Consumption,
    /// Elastic premium app service plan
    Premium,
    /// Isolated plan inside an app service environment
    Isolated,
}

/// Worker settings derived from a runtime string such as `node14`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRuntime {
    pub worker_runtime: &'static str,
    pub node_version: Option<String>,
}

impl FunctionRuntime {
    /// Parse `node<N>`, `python<X.Y>` or `dotnet<N>`.
    pub fn parse(runtime: &str) -> DeployResult<Self> {
        let runtime = runtime.trim().to_lowercase();

        if let Some(version) = runtime.strip_prefix("node")
            && is_version(version, false)
        {
            return Ok(Self {
                worker_runtime: "node",
                node_version: Some(format!("~{}", version)),
            });
        }
        if let Some(version) = runtime.strip_prefix("python")
            && is_version(version, true)
        {
            return Ok(Self {
                worker_runtime: "python",
                node_version: None,
            });
        }
        if let Some(version) = runtime.strip_prefix("dotnet")
            && is_version(version, true)
        {
            return Ok(Self {
                worker_runtime: "dotnet",
                node_version: None,
            });
        }

        Err(DeployError::InvalidConfiguration(format!(
            "unsupported runtime '{}', expected node<N>, python<X.Y> or dotnet<N>",
            runtime
        )))
    }
}

fn is_version(version: &str, allow_dots: bool) -> bool {
    !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        && (allow_dots || !version.contains('.'))
}

#[derive(Debug)]
pub struct FunctionAppResource {
    plan: HostingPlan,
}

impl FunctionAppResource {
    pub fn new(plan: HostingPlan) -> Self {
        Self { plan }
    }

    fn app_settings(&self, runtime: &FunctionRuntime) -> Vec<Value> {
        let mut settings = vec![
            setting("FUNCTIONS_WORKER_RUNTIME", &param("functionAppWorkerRuntime")),
            setting(
                "FUNCTIONS_EXTENSION_VERSION",
                &param("functionAppExtensionVersion"),
            ),
            setting("AzureWebJobsStorage", STORAGE_CONNECTION_STRING),
            setting("APPINSIGHTS_INSTRUMENTATIONKEY", INSTRUMENTATION_KEY),
            setting("WEBSITE_RUN_FROM_PACKAGE", "1"),
        ];
        if runtime.node_version.is_some() {
            settings.push(setting(
                "WEBSITE_NODE_DEFAULT_VERSION",
                &param("functionAppNodeVersion"),
            ));
        }
        // Isolated plans run without a content share.
        if self.plan != HostingPlan::Isolated {
            settings.push(setting(
                "WEBSITE_CONTENTAZUREFILECONNECTIONSTRING",
                STORAGE_CONNECTION_STRING,
            ));
            settings.push(setting(
                "WEBSITE_CONTENTSHARE",
                "[toLower(parameters('functionAppName'))]",
            ));
        }
        settings
    }

    /// Site or slot properties. Without `settings` no `siteConfig` is
    /// emitted, leaving the deployed app settings untouched.
    fn site_properties(&self, settings: Option<Vec<Value>>) -> Value {
        let mut properties = json!({
            "clientAffinityEnabled": false,
            "httpsOnly": true,
        });
        if let Some(settings) = settings {
            properties["siteConfig"] = json!({ "appSettings": settings });
        }
        if self.plan != HostingPlan::Consumption {
            properties["serverFarmId"] =
                json!(resource_id("Microsoft.Web/serverfarms", "appServicePlanName"));
        }
        if self.plan == HostingPlan::Isolated {
            properties["hostingEnvironmentProfile"] = json!({
                "id": resource_id("Microsoft.Web/hostingEnvironments", "hostingEnvironmentName")
            });
        }
        properties
    }

    fn depends_on(&self) -> Vec<String> {
        let mut depends_on = vec![
            resource_id("Microsoft.Storage/storageAccounts", "storageAccountName"),
            "[concat('microsoft.insights/components/', parameters('appInsightsName'))]"
                .to_string(),
        ];
        if self.plan != HostingPlan::Consumption {
            depends_on.push(resource_id(
                "Microsoft.Web/serverfarms",
                "appServicePlanName",
            ));
        }
        depends_on
    }

    fn declarations(&self, runtime: &FunctionRuntime, slot: bool) -> ParameterDeclarations {
        let mut declarations = ParameterDeclarations::from([
            location_declaration(),
            ("functionAppName".to_string(), ParameterDeclaration::string()),
            (
                "functionAppWorkerRuntime".to_string(),
                ParameterDeclaration::string().with_default("node"),
            ),
            (
                "functionAppExtensionVersion".to_string(),
                ParameterDeclaration::string().with_default(DEFAULT_EXTENSION_VERSION),
            ),
            ("storageAccountName".to_string(), ParameterDeclaration::string()),
            ("appInsightsName".to_string(), ParameterDeclaration::string()),
        ]);
        if runtime.node_version.is_some() {
            declarations.insert(
                "functionAppNodeVersion".to_string(),
                ParameterDeclaration::string().with_default("~14"),
            );
        }
        if self.plan != HostingPlan::Consumption {
            declarations.insert(
                "appServicePlanName".to_string(),
                ParameterDeclaration::string(),
            );
        }
        if self.plan == HostingPlan::Isolated {
            declarations.insert(
                "hostingEnvironmentName".to_string(),
                ParameterDeclaration::string(),
            );
        }
        if slot {
            declarations.insert(
                "functionAppSlotName".to_string(),
                ParameterDeclaration::string(),
            );
        }
        declarations
    }
}

impl ArmResource for FunctionAppResource {
    fn template(&self, config: &ServiceConfig) -> DeployResult<Manifest> {
        let runtime = FunctionRuntime::parse(&config.provider.runtime)?;
        let slot = config.provider.deployment.targets_slot();
        let settings = self.app_settings(&runtime);

        // A slot deployment must not rewrite the production site's settings.
        let site_settings = if slot { None } else { Some(settings.clone()) };
        let site = Resource::new(SITE_RESOURCE_TYPE, param("functionAppName"))
            .with_api_version(SITE_API_VERSION)
            .with_location(LOCATION)
            .with_kind(FUNCTION_APP_KIND)
            .with_identity(system_assigned_identity())
            .with_depends_on(self.depends_on())
            .with_properties(self.site_properties(site_settings));

        let mut resources = Vec::new();
        if slot {
            resources.push(site);
            resources.push(
                Resource::new(
                    SLOT_RESOURCE_TYPE,
                    "[concat(parameters('functionAppName'), '/', parameters('functionAppSlotName'))]",
                )
                .with_api_version(SITE_API_VERSION)
                .with_location(LOCATION)
                .with_kind(FUNCTION_APP_KIND)
                .with_identity(system_assigned_identity())
                .with_depends_on(vec![resource_id(SITE_RESOURCE_TYPE, "functionAppName")])
                .with_properties(self.site_properties(Some(settings))),
            );
        } else {
            // Sticky names may only be declared on the production site.
            resources.push(
                site.with_child(
                    Resource::new("config", SLOT_CONFIG_NAMES)
                        .with_api_version(SITE_API_VERSION)
                        .with_depends_on(vec![resource_id(SITE_RESOURCE_TYPE, "functionAppName")])
                        .with_properties(json!({ "appSettingNames": [] })),
                ),
            );
        }

        Ok(Manifest::fragment(
            self.declarations(&runtime, slot),
            resources,
        ))
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        let runtime = FunctionRuntime::parse(&config.provider.runtime)?;

        let mut parameters = ParameterSet::from([
            location_parameter(config),
            (
                "functionAppName".to_string(),
                Parameter::value(function_app_name(config)),
            ),
            (
                "functionAppWorkerRuntime".to_string(),
                Parameter::value(runtime.worker_runtime),
            ),
            (
                "storageAccountName".to_string(),
                Parameter::value(naming::storage_account_name(config)),
            ),
            (
                "appInsightsName".to_string(),
                Parameter::value(app_insights_name(config)),
            ),
        ]);
        insert_configured(
            &mut parameters,
            "functionAppExtensionVersion",
            config
                .provider
                .function_app
                .as_ref()
                .and_then(|f| f.extension_version.clone()),
        );
        insert_configured(&mut parameters, "functionAppNodeVersion", runtime.node_version);
        if self.plan != HostingPlan::Consumption {
            parameters.insert(
                "appServicePlanName".to_string(),
                Parameter::value(app_service_plan_name(config)),
            );
        }
        if self.plan == HostingPlan::Isolated {
            parameters.insert(
                "hostingEnvironmentName".to_string(),
                Parameter::value(hosting_environment_name(config)),
            );
        }
        insert_configured(
            &mut parameters,
            "functionAppSlotName",
            config.provider.deployment.target_slot(),
        );
        Ok(parameters)
    }
}

fn setting(name: &str, value: &str) -> Value {
    json!({ "name": name, "value": value })
}
