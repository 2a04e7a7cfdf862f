use serde_json::json;

use super::{LOCATION, app_insights_name, location_declaration, location_parameter, param};
use crate::config::ServiceConfig;
use crate::error::DeployResult;
use crate::manifest::{
    Manifest, Parameter, ParameterDeclaration, ParameterDeclarations, ParameterSet, Resource,
};
use crate::template::ArmResource;

const APP_INSIGHTS_TYPE: &str = "microsoft.insights/components";

#[derive(Debug, Default)]
pub struct AppInsightsResource;

impl ArmResource for AppInsightsResource {
    fn template(&self, _config: &ServiceConfig) -> DeployResult<Manifest> {
        let declarations = ParameterDeclarations::from([
            location_declaration(),
            ("appInsightsName".to_string(), ParameterDeclaration::string()),
        ]);

        let insights = Resource::new(APP_INSIGHTS_TYPE, param("appInsightsName"))
            .with_api_version("2015-05-01")
            .with_location(LOCATION)
            .with_kind("web")
            .with_properties(json!({
                "Application_Type": "web",
                "ApplicationId": param("appInsightsName"),
                "Request_Source": "IbizaWebAppExtensionCreate",
            }));

        Ok(Manifest::fragment(declarations, vec![insights]))
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        Ok(ParameterSet::from([
            location_parameter(config),
            (
                "appInsightsName".to_string(),
                Parameter::value(app_insights_name(config)),
            ),
        ]))
    }
}
