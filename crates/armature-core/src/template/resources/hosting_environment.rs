use serde_json::json;

use super::virtual_network::{DEFAULT_SUBNET, VIRTUAL_NETWORK_TYPE};
use super::{
    LOCATION, hosting_environment_name, location_declaration, location_parameter, param,
    resource_id, virtual_network_name,
};
use crate::config::ServiceConfig;
use crate::error::DeployResult;
use crate::manifest::{
    Manifest, Parameter, ParameterDeclaration, ParameterDeclarations, ParameterSet, Resource,
};
use crate::template::ArmResource;

const HOSTING_ENVIRONMENT_TYPE: &str = "Microsoft.Web/hostingEnvironments";

/// App service environment (ASEv2) inside the generated virtual network.
#[derive(Debug, Default)]
pub struct HostingEnvironmentResource;

impl ArmResource for HostingEnvironmentResource {
    fn template(&self, _config: &ServiceConfig) -> DeployResult<Manifest> {
        let declarations = ParameterDeclarations::from([
            location_declaration(),
            ("hostingEnvironmentName".to_string(), ParameterDeclaration::string()),
            ("virtualNetworkName".to_string(), ParameterDeclaration::string()),
        ]);

        let environment = Resource::new(HOSTING_ENVIRONMENT_TYPE, param("hostingEnvironmentName"))
            .with_api_version("2019-08-01")
            .with_location(LOCATION)
            .with_kind("ASEV2")
            .with_depends_on(vec![resource_id(VIRTUAL_NETWORK_TYPE, "virtualNetworkName")])
            .with_properties(json!({
                "name": param("hostingEnvironmentName"),
                "location": LOCATION,
                "ipsslAddressCount": 0,
                "internalLoadBalancingMode": "None",
                "virtualNetwork": {
                    "id": resource_id(VIRTUAL_NETWORK_TYPE, "virtualNetworkName"),
                    "subnet": DEFAULT_SUBNET,
                }
            }));

        Ok(Manifest::fragment(declarations, vec![environment]))
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        Ok(ParameterSet::from([
            location_parameter(config),
            (
                "hostingEnvironmentName".to_string(),
                Parameter::value(hosting_environment_name(config)),
            ),
            (
                "virtualNetworkName".to_string(),
                Parameter::value(virtual_network_name(config)),
            ),
        ]))
    }
}
