use serde_json::{Value, json};

use super::{
    HostingPlan, LOCATION, app_service_plan_name, hosting_environment_name, insert_configured,
    location_declaration, location_parameter, param, resource_id,
};
use crate::config::ServiceConfig;
use crate::error::{DeployError, DeployResult};
use crate::manifest::{
    Manifest, Parameter, ParameterDeclaration, ParameterDeclarations, ParameterSet, Resource,
};
use crate::template::ArmResource;

const SERVER_FARM_TYPE: &str = "Microsoft.Web/serverfarms";

/// Dedicated plan for premium and isolated hosting.
#[derive(Debug)]
pub struct AppServicePlanResource {
    plan: HostingPlan,
}

impl AppServicePlanResource {
    pub fn new(plan: HostingPlan) -> Self {
        Self { plan }
    }

    fn default_sku(&self) -> DeployResult<(&'static str, &'static str)> {
        match self.plan {
            HostingPlan::Premium => Ok(("EP1", "ElasticPremium")),
            HostingPlan::Isolated => Ok(("I1", "Isolated")),
            HostingPlan::Consumption => Err(DeployError::InvalidConfiguration(
                "consumption hosting has no app service plan".to_string(),
            )),
        }
    }

    fn properties(&self) -> Value {
        match self.plan {
            HostingPlan::Isolated => json!({
                "hostingEnvironmentProfile": {
                    "id": resource_id("Microsoft.Web/hostingEnvironments", "hostingEnvironmentName")
                }
            }),
            _ => json!({
                "maximumElasticWorkerCount": param("appServicePlanMaxWorkerCount")
            }),
        }
    }
}

impl ArmResource for AppServicePlanResource {
    fn template(&self, _config: &ServiceConfig) -> DeployResult<Manifest> {
        let (sku_name, sku_tier) = self.default_sku()?;

        let mut declarations = ParameterDeclarations::from([
            location_declaration(),
            ("appServicePlanName".to_string(), ParameterDeclaration::string()),
            (
                "appServicePlanSkuName".to_string(),
                ParameterDeclaration::string().with_default(sku_name),
            ),
            (
                "appServicePlanSkuTier".to_string(),
                ParameterDeclaration::string().with_default(sku_tier),
            ),
            (
                "appServicePlanSkuCapacity".to_string(),
                ParameterDeclaration::int().with_default(1),
            ),
        ]);

        let mut plan = Resource::new(SERVER_FARM_TYPE, param("appServicePlanName"))
            .with_api_version("2018-02-01")
            .with_location(LOCATION)
            .with_field(
                "sku",
                json!({
                    "name": param("appServicePlanSkuName"),
                    "tier": param("appServicePlanSkuTier"),
                    "capacity": param("appServicePlanSkuCapacity"),
                }),
            )
            .with_properties(self.properties());

        if self.plan == HostingPlan::Isolated {
            declarations.insert(
                "hostingEnvironmentName".to_string(),
                ParameterDeclaration::string(),
            );
            plan = plan.with_depends_on(vec![resource_id(
                "Microsoft.Web/hostingEnvironments",
                "hostingEnvironmentName",
            )]);
        } else {
            declarations.insert(
                "appServicePlanMaxWorkerCount".to_string(),
                ParameterDeclaration::int().with_default(20),
            );
            plan = plan.with_kind("elastic");
        }

        Ok(Manifest::fragment(declarations, vec![plan]))
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        let mut parameters = ParameterSet::from([
            location_parameter(config),
            (
                "appServicePlanName".to_string(),
                Parameter::value(app_service_plan_name(config)),
            ),
        ]);
        if self.plan == HostingPlan::Isolated {
            parameters.insert(
                "hostingEnvironmentName".to_string(),
                Parameter::value(hosting_environment_name(config)),
            );
        }

        let sku = config
            .provider
            .app_service_plan
            .as_ref()
            .and_then(|p| p.sku.as_ref());
        insert_configured(
            &mut parameters,
            "appServicePlanSkuName",
            sku.and_then(|s| s.name.clone()),
        );
        insert_configured(
            &mut parameters,
            "appServicePlanSkuTier",
            sku.and_then(|s| s.tier.clone()),
        );
        insert_configured(
            &mut parameters,
            "appServicePlanSkuCapacity",
            sku.and_then(|s| s.capacity),
        );
        Ok(parameters)
    }
}
